//! Dashboard summary shapes

use serde::{Deserialize, Serialize};

use crate::aggregate::ExecutionStats;
use crate::models::ExecutionStatus;

/// Headline counters for one time window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    pub pending_executions: u64,
    pub warning_executions: u64,
    /// Mean execution time in milliseconds
    pub avg_execution_time: f64,
    pub total_records_processed: u64,
    /// Percentage of executions that succeeded, 0 when there are none
    pub success_rate: f64,
}

impl From<&ExecutionStats> for SummaryStats {
    fn from(stats: &ExecutionStats) -> Self {
        Self {
            total_executions: stats.count,
            successful_executions: stats.success,
            failed_executions: stats.failed,
            pending_executions: stats.pending,
            warning_executions: stats.warning,
            avg_execution_time: stats.avg_execution_ms(),
            total_records_processed: stats.records_processed,
            success_rate: stats.success_rate(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

impl TrendDirection {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            TrendDirection::Up
        } else if change < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

/// Change versus the preceding window of equal length.
///
/// Count changes are percentages; `success_rate_change` is in percentage
/// points. All values are rounded to one decimal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub total_change: f64,
    pub success_change: f64,
    pub failure_change: f64,
    pub success_rate_change: f64,
    pub total_trend: TrendDirection,
    pub success_trend: TrendDirection,
    pub failure_trend: TrendDirection,
    pub success_rate_trend: TrendDirection,
}

/// One row of the hourly performance breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRow {
    /// UTC hour of day, 0..=23
    pub hour: u32,
    pub interface_name: String,
    pub avg_execution_time: f64,
    pub max_execution_time: u64,
    pub min_execution_time: u64,
    pub total_records: u64,
    pub execution_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
}

/// Record count for one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ExecutionStatus,
    pub count: u64,
}
