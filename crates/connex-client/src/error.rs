//! Error types for ConnexView client operations

use std::sync::Arc;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ConnexClientError>;

/// Errors that can occur during client operations
#[derive(Error, Debug)]
pub enum ConnexClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Server returned an error envelope
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Request was rejected by the server's rate limiter
    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,

    /// Failure of a fetch that several callers waited on
    #[error(transparent)]
    Shared(Arc<ConnexClientError>),
}

impl ConnexClientError {
    /// Create a server error from status code and message
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }
}

impl From<Arc<ConnexClientError>> for ConnexClientError {
    /// Unwrap an error handed out by the response cache.
    ///
    /// Copyable variants are rebuilt so callers can still match on them;
    /// transport errors stay behind the `Arc`.
    fn from(err: Arc<ConnexClientError>) -> Self {
        let shared = match Arc::try_unwrap(err) {
            Ok(err) => return err,
            Err(shared) => shared,
        };
        let rebuilt = match shared.as_ref() {
            Self::ServerError { status, message } => Some(Self::server_error(*status, message)),
            Self::RateLimited { retry_after } => Some(Self::RateLimited {
                retry_after: *retry_after,
            }),
            Self::ParseError(msg) => Some(Self::ParseError(msg.clone())),
            Self::InvalidUrl(e) => Some(Self::InvalidUrl(*e)),
            Self::Timeout => Some(Self::Timeout),
            _ => None,
        };
        match rebuilt {
            Some(err) => err,
            None => Self::Shared(shared),
        }
    }
}
