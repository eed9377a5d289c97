//! Interface log handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use connex_core::{pagination, DistinctField, ExecutionLog, NewExecutionLog, Pagination};
use serde::Serialize;
use tracing::{debug, info};

use super::params::{ApiQuery, AppliedFilters, LogsQuery};
use crate::error::{ApiError, StoreResultExt};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    pub success: bool,
    pub logs: Vec<ExecutionLog>,
    pub pagination: Pagination,
    pub filters: AppliedFilters,
    pub last_updated: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceNamesResponse {
    pub success: bool,
    pub interface_names: Vec<String>,
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationKeysResponse {
    pub success: bool,
    pub integration_keys: Vec<String>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct RecordLogResponse {
    pub success: bool,
    pub log: ExecutionLog,
}

/// GET /interfaces/logs (also /dashboard/logs)
pub async fn list_logs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let filter = query.to_filter(Utc::now())?;
    debug!(
        time_range = %filter.window.range,
        page = filter.page.page(),
        limit = filter.page.limit(),
        "Listing interface logs"
    );

    let page = state
        .timed(pagination::paginate(state.store(), &filter))
        .await
        .context("Failed to fetch interface logs")?;

    Ok(Json(LogsResponse {
        success: true,
        logs: page.items,
        pagination: page.pagination,
        filters: AppliedFilters::from(&filter),
        last_updated: Utc::now(),
    }))
}

/// GET /interfaces/names
pub async fn list_names(
    State(state): State<AppState>,
) -> Result<Json<InterfaceNamesResponse>, ApiError> {
    let interface_names = state
        .timed(state.store().distinct(DistinctField::InterfaceName))
        .await
        .context("Failed to fetch interface names")?;

    Ok(Json(InterfaceNamesResponse {
        success: true,
        count: interface_names.len(),
        interface_names,
    }))
}

/// GET /interfaces/keys
pub async fn list_keys(
    State(state): State<AppState>,
) -> Result<Json<IntegrationKeysResponse>, ApiError> {
    let integration_keys = state
        .timed(state.store().distinct(DistinctField::IntegrationKey))
        .await
        .context("Failed to fetch integration keys")?;

    Ok(Json(IntegrationKeysResponse {
        success: true,
        count: integration_keys.len(),
        integration_keys,
    }))
}

/// POST /interfaces/logs - record one execution
pub async fn record_log(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<RecordLogResponse>), ApiError> {
    let new_log: NewExecutionLog = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid execution log: {}", e)))?;
    new_log.check()?;

    let log = state
        .timed(state.store().insert(new_log))
        .await
        .context("Failed to record execution log")?;
    info!(id = %log.id, interface = %log.interface_name, status = %log.status, "Recorded execution");

    Ok((
        StatusCode::CREATED,
        Json(RecordLogResponse { success: true, log }),
    ))
}
