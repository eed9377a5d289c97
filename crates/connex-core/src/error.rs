//! Common error types for record stores and request normalization

use std::time::Duration;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for core operations that may also fail validation
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by a [`crate::LogStore`] implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A query did not complete within its time budget
    #[error("Store query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A record was rejected on insert
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Anything else the store reports
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Unavailable(_) => 500,
            StoreError::Timeout(_) => 504,
            StoreError::InvalidRecord(_) => 400,
            StoreError::Internal(_) => 500,
        }
    }
}

/// Errors from request normalization and record validation
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or missing input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Failure reported by the record store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
