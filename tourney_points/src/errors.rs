//! Error taxonomy shared by every points operation.

use crate::db::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable classification of a [`PointsError`], suitable for wire responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidArgument,
    InsufficientFunds,
    EmptyCandidateSet,
    StoreUnavailable,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::InvalidArgument => write!(f, "invalid_argument"),
            ErrorKind::InsufficientFunds => write!(f, "insufficient_funds"),
            ErrorKind::EmptyCandidateSet => write!(f, "empty_candidate_set"),
            ErrorKind::StoreUnavailable => write!(f, "store_unavailable"),
        }
    }
}

/// Points engine errors
#[derive(Debug, Error)]
pub enum PointsError {
    /// Unknown player or tournament
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate tournament, duplicate leader join, or tournament already finished
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rejected input (negative amounts, empty ids, malformed numbers)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Balance too low for the requested debit
    #[error("Insufficient funds for player {player_id}: available {available}, required {required}")]
    InsufficientFunds {
        player_id: String,
        available: i64,
        required: i64,
    },

    /// Nothing to choose from during random selection
    #[error("No candidates: {0}")]
    EmptyCandidateSet(String),

    /// Persistence layer failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl PointsError {
    /// Stable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PointsError::NotFound(_) => ErrorKind::NotFound,
            PointsError::Conflict(_) => ErrorKind::Conflict,
            PointsError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PointsError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            PointsError::EmptyCandidateSet(_) => ErrorKind::EmptyCandidateSet,
            PointsError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Get a client-safe error message
    ///
    /// Store errors are sanitized so SQL details never leave the process.
    pub fn client_message(&self) -> String {
        match self {
            PointsError::StoreUnavailable(_) => "Storage temporarily unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for points operations
pub type PointsResult<T> = Result<T, PointsError>;

/// Reject empty identifiers before they reach the store.
pub(crate) fn require_id(field: &str, value: &str) -> PointsResult<()> {
    if value.trim().is_empty() {
        return Err(PointsError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Reject negative point amounts.
pub(crate) fn require_non_negative(field: &str, value: i64) -> PointsResult<()> {
    if value < 0 {
        return Err(PointsError::InvalidArgument(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}
