//! Dashboard handlers
//!
//! Supports:
//! - GET /dashboard/summary - windowed counts plus trends
//! - GET /dashboard/realtime - last five minutes
//! - GET /dashboard/performance - hour-of-day by interface breakdown
//! - GET /dashboard/health - liveness and record count

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use connex_core::{
    summary, ExecutionLog, LogFilter, PerformanceRow, StatusCount, SummaryStats, Trends,
};
use serde::Serialize;
use tracing::warn;

use super::params::{ApiQuery, WindowQuery};
use crate::error::{ApiError, StoreResultExt};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub success: bool,
    pub time_range: String,
    pub summary: SummaryStats,
    pub trends: Trends,
    pub last_updated: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeResponse {
    pub success: bool,
    pub recent_logs: Vec<ExecutionLog>,
    pub status_counts: Vec<StatusCount>,
    pub last_updated: DateTime<Utc>,
    pub time_window: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub success: bool,
    pub time_range: String,
    pub performance_data: Vec<PerformanceRow>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
    /// Seconds since the server started
    pub uptime: f64,
    pub memory: MemoryUsage,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub total_records: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Resident set size, when the platform reports it
    pub rss_bytes: Option<u64>,
}

/// GET /dashboard/summary
pub async fn get_summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WindowQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let now = Utc::now();
    let window = query.window(now)?;

    let (summary, trends) = state
        .timed(summary::summary_with_trends(state.store(), &window, now))
        .await
        .context("Failed to fetch dashboard summary")?;

    Ok(Json(SummaryResponse {
        success: true,
        time_range: window.range.as_token().to_string(),
        summary,
        trends,
        last_updated: Utc::now(),
    }))
}

/// GET /dashboard/realtime
pub async fn get_realtime(State(state): State<AppState>) -> Result<Json<RealtimeResponse>, ApiError> {
    let snapshot = state
        .timed(summary::realtime(state.store(), Utc::now()))
        .await
        .context("Failed to fetch real-time data")?;

    Ok(Json(RealtimeResponse {
        success: true,
        recent_logs: snapshot.recent_logs,
        status_counts: snapshot.status_counts,
        last_updated: Utc::now(),
        time_window: format!("{} minutes", summary::REALTIME_WINDOW_MINUTES),
    }))
}

/// GET /dashboard/performance
pub async fn get_performance(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WindowQuery>,
) -> Result<Json<PerformanceResponse>, ApiError> {
    let window = query.window(Utc::now())?;

    let performance_data = state
        .timed(summary::performance(state.store(), &window))
        .await
        .context("Failed to fetch performance metrics")?;

    Ok(Json(PerformanceResponse {
        success: true,
        time_range: window.range.as_token().to_string(),
        performance_data,
        last_updated: Utc::now(),
    }))
}

/// GET /dashboard/health
///
/// Answers 503 with `{status: "unhealthy"}` when the store does not respond.
pub async fn get_health(State(state): State<AppState>) -> Response {
    let probe = async {
        state.store().ping().await?;
        state.store().count(&LogFilter::all()).await
    };

    match state.timed(probe).await {
        Ok(total_records) => Json(HealthResponse {
            status: "healthy",
            timestamp: Utc::now(),
            database: DatabaseHealth {
                connected: true,
                total_records,
            },
            uptime: state.uptime_secs(),
            memory: MemoryUsage {
                rss_bytes: resident_memory(),
            },
            version: env!("CARGO_PKG_VERSION"),
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "timestamp": Utc::now(),
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Resident set size from procfs (Linux only)
fn resident_memory() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}
