//! Root info and unknown-route handlers

use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Public endpoints, relative to the `/api/v1` (or `/api`) prefix
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/dashboard/summary"),
    ("GET", "/dashboard/logs"),
    ("GET", "/dashboard/realtime"),
    ("GET", "/dashboard/performance"),
    ("GET", "/dashboard/health"),
    ("GET", "/interfaces/logs"),
    ("POST", "/interfaces/logs"),
    ("GET", "/interfaces/names"),
    ("GET", "/interfaces/keys"),
    ("POST", "/data/seed"),
    ("POST", "/data/add-more"),
];

fn endpoint_list() -> Vec<String> {
    ENDPOINTS
        .iter()
        .map(|(method, path)| format!("{} /api/v1{}", method, path))
        .collect()
}

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "ConnexView API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": endpoint_list(),
    }))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "Unknown route");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": format!("Route {} not found", uri.path()),
            "error": "not_found",
            "availableEndpoints": endpoint_list(),
        })),
    )
}
