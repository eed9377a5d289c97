//! API error types and conversions
//!
//! Every failure leaves the server as `{success: false, message, error}`.
//! Outside production the envelope also carries `details`, attached by the
//! [`attach_error_details`] response layer.

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use connex_core::{CoreError, StoreError};
use serde::Serialize;
use serde_json::Value;

/// API error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 404 Not Found
    NotFound(String),
    /// 429 Too Many Requests
    TooManyRequests { retry_after: u64 },
    /// 503 Service Unavailable
    ServiceUnavailable(String),
    /// 504 Gateway Timeout
    GatewayTimeout(String),
    /// 500 Internal Server Error
    Internal(String),
    /// A failed store operation, with a caller-facing summary
    Operation { message: String, source: StoreError },
}

/// Standard error envelope
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    message: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

/// Debug rendering of the failure, carried as a response extension
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub String);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Operation { source, .. } => StatusCode::from_u16(source.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = ErrorDetails(format!("{:?}", self));

        let (error, message, retry_after) = match self {
            ApiError::BadRequest(msg) => ("bad_request".to_string(), msg, None),
            ApiError::NotFound(msg) => ("not_found".to_string(), msg, None),
            ApiError::TooManyRequests { retry_after } => (
                "too_many_requests".to_string(),
                "Too many requests from this IP, please try again later.".to_string(),
                Some(retry_after),
            ),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable".to_string(), msg, None),
            ApiError::GatewayTimeout(msg) => ("gateway_timeout".to_string(), msg, None),
            ApiError::Internal(msg) => ("internal_error".to_string(), msg, None),
            ApiError::Operation { message, source } => (source.to_string(), message, None),
        };

        // Log errors at appropriate levels
        if status.is_server_error() {
            tracing::error!(%error, %message, "API error");
        } else if status.is_client_error() {
            tracing::debug!(%error, %message, "API client error");
        }

        let body = Json(ErrorResponse {
            success: false,
            message,
            error,
            retry_after,
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, secs.into());
        }
        response.extensions_mut().insert(details);
        response
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidRecord(msg) => ApiError::BadRequest(msg),
            StoreError::Timeout(budget) => ApiError::GatewayTimeout(format!(
                "Store query timed out after {}ms",
                budget.as_millis()
            )),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ApiError::BadRequest(msg),
            CoreError::Store(e) => ApiError::from(e),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Attach a caller-facing summary to store failures
pub trait StoreResultExt<T> {
    fn context(self, message: &str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn context(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::Operation {
            message: message.to_string(),
            source,
        })
    }
}

/// Response layer copying [`ErrorDetails`] into the JSON error body.
///
/// Installed only outside production.
pub async fn attach_error_details(mut response: Response) -> Response {
    let Some(ErrorDetails(details)) = response.extensions_mut().remove::<ErrorDetails>() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let mut value: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };
    if let Some(obj) = value.as_object_mut() {
        obj.insert("details".into(), Value::String(details));
    }

    match serde_json::to_vec(&value) {
        Ok(encoded) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(encoded))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}
