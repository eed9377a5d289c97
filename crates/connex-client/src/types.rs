//! Response types for the ConnexView API
//!
//! Records and aggregates reuse the `connex-core` models; only the
//! envelopes are defined here. Every envelope has a `Default` that stands
//! in for it when the dashboard runs degraded.

use chrono::{DateTime, Utc};
use connex_core::{
    ExecutionLog, ExecutionStatus, Pagination, PerformanceRow, StatusCount, SummaryStats, Trends,
};
use serde::{Deserialize, Serialize};

/// Error envelope returned on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
    #[serde(default, rename = "retryAfter")]
    pub retry_after: Option<u64>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub time_range: String,
    pub summary: SummaryStats,
    #[serde(default)]
    pub trends: Trends,
    pub last_updated: DateTime<Utc>,
}

/// Filters the server applied to a log page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppliedFilters {
    pub time_range: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<ExecutionStatus>,
    pub interface_name: Option<String>,
    pub integration_key: Option<String>,
    pub sort_by: String,
    pub sort_order: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsPage {
    pub logs: Vec<ExecutionLog>,
    pub pagination: Pagination,
    #[serde(default)]
    pub filters: AppliedFilters,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeSnapshot {
    pub recent_logs: Vec<ExecutionLog>,
    pub status_counts: Vec<StatusCount>,
    pub last_updated: DateTime<Utc>,
    pub time_window: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub time_range: String,
    pub performance_data: Vec<PerformanceRow>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InterfaceNames {
    pub interface_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntegrationKeys {
    pub integration_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecordedLog {
    pub log: ExecutionLog,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub connected: bool,
    pub total_records: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseStatus,
    pub uptime: f64,
    pub version: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.database.connected
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResult {
    pub message: String,
    pub records_inserted: u64,
    pub stats: SummaryStats,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMoreResult {
    pub message: String,
    pub records_added: u64,
}

/// Combined summary and performance for one time range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub time_range: String,
    pub summary: SummaryStats,
    pub trends: Trends,
    pub performance: Vec<PerformanceRow>,
}

/// Query parameters for a log page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsParams {
    pub page: u64,
    pub limit: u64,
    pub time_range: String,
    pub status: Option<ExecutionStatus>,
    pub interface_name: String,
    pub integration_key: String,
    pub sort_by: String,
    pub sort_order: String,
}

impl Default for LogsParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            time_range: "24h".to_string(),
            status: None,
            interface_name: String::new(),
            integration_key: String::new(),
            sort_by: "timestamp".to_string(),
            sort_order: "desc".to_string(),
        }
    }
}

impl LogsParams {
    /// Query pairs; blank filters are sent empty and dropped by the cache key
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("timeRange", crate::time_range::normalize(&self.time_range).to_string()),
            (
                "status",
                self.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            ),
            ("interfaceName", self.interface_name.clone()),
            ("integrationKey", self.integration_key.clone()),
            ("sortBy", self.sort_by.clone()),
            ("sortOrder", self.sort_order.clone()),
        ]
    }
}
