//! Summary/Aggregation Engine
//!
//! Every function here tolerates an empty window and returns zeroed
//! defaults rather than failing.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::aggregate::{round1, ExecutionStats};
use crate::error::StoreResult;
use crate::models::{
    ExecutionLog, PerformanceRow, SortSpec, StatusCount, SummaryStats, TimeWindow, TrendDirection,
    Trends,
};
use crate::query::window_filter;
use crate::store::{GroupId, GroupKey, LogQuery, LogStore};

/// Lookback of the realtime snapshot
pub const REALTIME_WINDOW_MINUTES: i64 = 5;
/// Most recent records included in the realtime snapshot
pub const RECENT_LOG_LIMIT: u64 = 100;

/// Counts and averages over one window
pub async fn summarize(store: &dyn LogStore, window: &TimeWindow) -> StoreResult<SummaryStats> {
    let groups = store.aggregate(&window_filter(window), GroupKey::All).await?;
    let stats = groups
        .into_iter()
        .next()
        .map(|g| g.stats)
        .unwrap_or_default();
    Ok(SummaryStats::from(&stats))
}

/// Summary for `window` plus change versus the preceding window of equal length.
///
/// Both aggregations run concurrently. Windows without a lower bound have no
/// predecessor and report stable, zero trends.
pub async fn summary_with_trends(
    store: &dyn LogStore,
    window: &TimeWindow,
    now: DateTime<Utc>,
) -> StoreResult<(SummaryStats, Trends)> {
    let previous_window = window.previous(now);
    let previous = async {
        match &previous_window {
            Some(w) => summarize(store, w).await.map(Some),
            None => Ok(None),
        }
    };

    let (current, previous) = futures::try_join!(summarize(store, window), previous)?;
    let trends = previous
        .map(|p| compute_trends(&current, &p))
        .unwrap_or_default();

    debug!(
        range = %window.range,
        total = current.total_executions,
        total_change = trends.total_change,
        "Computed summary"
    );
    Ok((current, trends))
}

/// Relative change in percent, rounded to one decimal.
///
/// A zero baseline reports 100 when the metric appeared and 0 otherwise.
pub fn percent_change(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    round1((current as f64 - previous as f64) / previous as f64 * 100.0)
}

pub fn compute_trends(current: &SummaryStats, previous: &SummaryStats) -> Trends {
    let total_change = percent_change(current.total_executions, previous.total_executions);
    let success_change =
        percent_change(current.successful_executions, previous.successful_executions);
    let failure_change = percent_change(current.failed_executions, previous.failed_executions);
    // percentage points, not relative
    let success_rate_change = round1(current.success_rate - previous.success_rate);

    Trends {
        total_change,
        success_change,
        failure_change,
        success_rate_change,
        total_trend: TrendDirection::of(total_change),
        success_trend: TrendDirection::of(success_change),
        failure_trend: TrendDirection::of(failure_change),
        success_rate_trend: TrendDirection::of(success_rate_change),
    }
}

/// Per hour-of-day and interface breakdown, ordered by hour then name
pub async fn performance(
    store: &dyn LogStore,
    window: &TimeWindow,
) -> StoreResult<Vec<PerformanceRow>> {
    let mut groups = store
        .aggregate(&window_filter(window), GroupKey::HourAndInterface)
        .await?;
    groups.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(groups
        .into_iter()
        .filter_map(|g| match g.id {
            GroupId::HourAndInterface {
                hour,
                interface_name,
            } => Some(performance_row(hour, interface_name, &g.stats)),
            _ => None,
        })
        .collect())
}

fn performance_row(hour: u32, interface_name: String, stats: &ExecutionStats) -> PerformanceRow {
    PerformanceRow {
        hour,
        interface_name,
        avg_execution_time: round1(stats.avg_execution_ms()),
        max_execution_time: stats.max_execution_ms.unwrap_or(0),
        min_execution_time: stats.min_execution_ms.unwrap_or(0),
        total_records: stats.records_processed,
        execution_count: stats.count,
        success_count: stats.success,
        failure_count: stats.failed,
    }
}

/// Record count per status; statuses with no records are omitted
pub async fn status_counts(
    store: &dyn LogStore,
    window: &TimeWindow,
) -> StoreResult<Vec<StatusCount>> {
    let groups = store
        .aggregate(&window_filter(window), GroupKey::Status)
        .await?;

    let mut counts: Vec<StatusCount> = groups
        .into_iter()
        .filter_map(|g| match g.id {
            GroupId::Status(status) => Some(StatusCount {
                status,
                count: g.stats.count,
            }),
            _ => None,
        })
        .collect();
    counts.sort_by_key(|c| c.status);
    Ok(counts)
}

/// Polling snapshot of the last few minutes
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeSnapshot {
    /// Newest first, at most [`RECENT_LOG_LIMIT`]
    pub recent_logs: Vec<ExecutionLog>,
    pub status_counts: Vec<StatusCount>,
}

pub async fn realtime(store: &dyn LogStore, now: DateTime<Utc>) -> StoreResult<RealtimeSnapshot> {
    let window = TimeWindow::trailing(Duration::minutes(REALTIME_WINDOW_MINUTES), now);
    let query = LogQuery {
        filter: window_filter(&window),
        sort: SortSpec::default(),
        skip: 0,
        limit: Some(RECENT_LOG_LIMIT),
    };

    let (recent_logs, status_counts) =
        futures::try_join!(store.find(&query), status_counts(store, &window))?;
    Ok(RealtimeSnapshot {
        recent_logs,
        status_counts,
    })
}
