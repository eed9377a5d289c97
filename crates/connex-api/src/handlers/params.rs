//! Query-string normalization
//!
//! Every field arrives as an optional string so malformed values reach the
//! normalizers instead of failing extraction.

use axum::extract::FromRequestParts;
use chrono::{DateTime, Utc};
use connex_core::{
    ExecutionStatus, PageRequest, QueryFilter, SortField, SortOrder, SortSpec, TimeWindow,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// `Query` whose rejections leave as the JSON error envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `timeRange` with optional custom bounds
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    pub time_range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl WindowQuery {
    pub fn window(&self, now: DateTime<Utc>) -> Result<TimeWindow, ApiError> {
        resolve_window(&self.time_range, &self.start_date, &self.end_date, now)
    }
}

/// Log browser parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub time_range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub interface_name: Option<String>,
    pub integration_key: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl LogsQuery {
    /// Validate and default every parameter into a typed filter
    pub fn to_filter(&self, now: DateTime<Utc>) -> Result<QueryFilter, ApiError> {
        let window = resolve_window(&self.time_range, &self.start_date, &self.end_date, now)?;

        let status = match non_empty(&self.status) {
            None => None,
            Some(s) => Some(s.parse::<ExecutionStatus>().map_err(ApiError::BadRequest)?),
        };

        // Unknown sort fields fall back to timestamp
        let field = match non_empty(&self.sort_by) {
            None => SortField::default(),
            Some(s) => s.parse::<SortField>().unwrap_or_else(|reason| {
                debug!(%reason, "Sorting by timestamp");
                SortField::default()
            }),
        };
        let order = SortOrder::parse_lenient(self.sort_order.as_deref());

        let mut filter = QueryFilter::for_window(window)
            .with_sort(SortSpec::new(field, order))
            .with_page(PageRequest::from_params(
                self.page.as_deref(),
                self.limit.as_deref(),
            ));
        filter.status = status;
        if let Some(name) = non_empty(&self.interface_name) {
            filter = filter.with_interface_name(name);
        }
        if let Some(key) = non_empty(&self.integration_key) {
            filter = filter.with_integration_key(key);
        }
        Ok(filter)
    }
}

/// The filters a log page was served with, echoed to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub time_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<ExecutionStatus>,
    pub interface_name: Option<String>,
    pub integration_key: Option<String>,
    pub sort_by: String,
    pub sort_order: String,
}

impl From<&QueryFilter> for AppliedFilters {
    fn from(filter: &QueryFilter) -> Self {
        let custom = filter.window.range == connex_core::TimeRange::Custom;
        Self {
            time_range: filter.window.range.as_token().to_string(),
            start_date: filter.window.start.filter(|_| custom),
            end_date: filter.window.end.filter(|_| custom),
            status: filter.status,
            interface_name: filter.interface_name.clone(),
            integration_key: filter.integration_key.clone(),
            sort_by: filter.sort.field.as_str().to_string(),
            sort_order: filter.sort.order.as_str().to_string(),
        }
    }
}

fn resolve_window(
    range: &Option<String>,
    start: &Option<String>,
    end: &Option<String>,
    now: DateTime<Utc>,
) -> Result<TimeWindow, ApiError> {
    Ok(TimeWindow::resolve(
        range.as_deref(),
        start.as_deref(),
        end.as_deref(),
        now,
    )?)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
