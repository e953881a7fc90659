//! Store error types.

use std::time::Duration;
use thiserror::Error;

/// Persistence failures surfaced by a [`Store`](super::Store) implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation timed out
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
