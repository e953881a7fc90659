//! Mapping engine errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tourney_points::{ErrorKind, PointsError, PointsResult};

use crate::{logging, metrics};

/// HTTP status for an error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidArgument | ErrorKind::InsufficientFunds => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound | ErrorKind::EmptyCandidateSet => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
}

/// A failed operation, tagged with the operation name for logs and metrics
#[derive(Debug)]
pub struct ApiError {
    pub operation: &'static str,
    pub error: PointsError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind();
        let status = status_for(kind);
        let message = self.error.client_message();

        // full error (with store detail) stays in the log
        logging::log_rejected_operation(
            self.operation,
            &kind.to_string(),
            status.as_u16(),
            &self.error.to_string(),
        );

        (
            status,
            Json(ErrorBody {
                error: message,
                kind,
            }),
        )
            .into_response()
    }
}

/// Attach an operation name to an engine result, counting its outcome
pub trait Operation<T> {
    fn during(self, operation: &'static str) -> Result<T, ApiError>;
}

impl<T> Operation<T> for PointsResult<T> {
    fn during(self, operation: &'static str) -> Result<T, ApiError> {
        match self {
            Ok(value) => {
                metrics::operations_total(operation, "ok");
                Ok(value)
            }
            Err(error) => {
                metrics::operations_total(operation, &error.kind().to_string());
                Err(ApiError { operation, error })
            }
        }
    }
}
