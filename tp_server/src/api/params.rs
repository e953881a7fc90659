//! Request parameters with engine-style validation errors.
//!
//! Parameters arrive as raw pairs so repeated keys (`backerId=P2&backerId=P3`)
//! survive, and malformed numbers surface as `InvalidArgument`. Pairs come from
//! the query string, followed by the body of a url-encoded form post.

use axum::{
    extract::{Form, FromRequest, Query, Request},
    http::{Method, header},
};
use tourney_points::{PointsError, PointsResult};

use super::error::ApiError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Raw parameter pairs in request order, query string first
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First non-blank value of `name`
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, value)| key == name && !value.trim().is_empty())
            .map(|(_, value)| value.as_str())
    }

    pub fn required(&self, name: &str) -> PointsResult<&str> {
        self.optional(name).ok_or_else(|| {
            PointsError::InvalidArgument(format!("missing parameter {name}"))
        })
    }

    pub fn required_i64(&self, name: &str) -> PointsResult<i64> {
        let raw = self.required(name)?;
        raw.trim().parse().map_err(|_| {
            PointsError::InvalidArgument(format!("{name} must be an integer, got '{raw}'"))
        })
    }

    /// Every non-blank value of `name`, in order
    pub fn all(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, value)| key == name && !value.trim().is_empty())
            .map(|(_, value)| value.clone())
            .collect()
    }
}

fn rejected(detail: impl std::fmt::Display) -> ApiError {
    ApiError {
        operation: "request",
        error: PointsError::InvalidArgument(format!("malformed parameters: {detail}")),
    }
}

fn is_form(request: &Request) -> bool {
    request.method() != Method::GET
        && request.method() != Method::HEAD
        && request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}

impl<S> FromRequest<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(mut pairs) =
            Query::<Vec<(String, String)>>::try_from_uri(request.uri()).map_err(rejected)?;

        if is_form(&request) {
            let Form(body) = Form::<Vec<(String, String)>>::from_request(request, state)
                .await
                .map_err(rejected)?;
            pairs.extend(body);
        }

        Ok(Self(pairs))
    }
}
