//! Time windows, sorting and the request-scoped query filter

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{ExecutionLog, ExecutionStatus};
use crate::pagination::PageRequest;

/// Named lookback period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    LastHour,
    #[default]
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    /// Caller-supplied explicit bounds
    #[serde(rename = "custom")]
    Custom,
}

impl TimeRange {
    /// Look up a compact token (`1h`, `24h`, `7d`, `30d`, `90d`, `custom`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1h" => Some(TimeRange::LastHour),
            "24h" => Some(TimeRange::Last24Hours),
            "7d" => Some(TimeRange::Last7Days),
            "30d" => Some(TimeRange::Last30Days),
            "90d" => Some(TimeRange::Last90Days),
            "custom" => Some(TimeRange::Custom),
            _ => None,
        }
    }

    /// Unknown or absent tokens fall back to the last 24 hours
    pub fn parse_or_default(token: Option<&str>) -> Self {
        token.and_then(Self::from_token).unwrap_or_default()
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            TimeRange::LastHour => "1h",
            TimeRange::Last24Hours => "24h",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
            TimeRange::Last90Days => "90d",
            TimeRange::Custom => "custom",
        }
    }

    /// Lookback length, `None` for custom ranges
    pub fn duration(&self) -> Option<Duration> {
        match self {
            TimeRange::LastHour => Some(Duration::hours(1)),
            TimeRange::Last24Hours => Some(Duration::hours(24)),
            TimeRange::Last7Days => Some(Duration::days(7)),
            TimeRange::Last30Days => Some(Duration::days(30)),
            TimeRange::Last90Days => Some(Duration::days(90)),
            TimeRange::Custom => None,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// A resolved, half-open time window `[start, end)`.
///
/// Either bound may be open. Named ranges resolve to `[now - duration, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub range: TimeRange,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Window for a named range, anchored at `now`
    pub fn named(range: TimeRange, now: DateTime<Utc>) -> Self {
        Self {
            range,
            start: range.duration().map(|d| now - d),
            end: None,
        }
    }

    /// Window with explicit bounds
    pub fn custom(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            range: TimeRange::Custom,
            start,
            end,
        }
    }

    /// The last `duration` before `now`
    pub fn trailing(duration: Duration, now: DateTime<Utc>) -> Self {
        Self::custom(Some(now - duration), None)
    }

    /// Resolve a `timeRange` token plus optional `startDate`/`endDate`.
    ///
    /// Bounds are only read for the `custom` token and must be RFC 3339.
    pub fn resolve(
        token: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let range = TimeRange::parse_or_default(token);
        if range != TimeRange::Custom {
            return Ok(Self::named(range, now));
        }

        let start = parse_bound("startDate", start)?;
        let end = parse_bound("endDate", end)?;
        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                return Err(CoreError::validation("endDate must not be before startDate"));
            }
        }
        Ok(Self::custom(start, end))
    }

    /// Whether `ts` falls inside the window
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts < e)
    }

    /// Length of the window, treating an open end as `now`.
    ///
    /// `None` when there is no lower bound.
    pub fn length(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start?;
        Some(self.end.unwrap_or(now) - start)
    }

    /// The immediately preceding window of equal length
    pub fn previous(&self, now: DateTime<Utc>) -> Option<TimeWindow> {
        let start = self.start?;
        let len = self.length(now)?;
        if len <= Duration::zero() {
            return None;
        }
        Some(TimeWindow {
            range: self.range,
            start: Some(start - len),
            end: Some(start),
        })
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => DateTime::parse_from_rfc3339(v)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| CoreError::validation(format!("{} '{}' is not RFC 3339: {}", name, v, e))),
    }
}

/// Fields the log browser can sort by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Timestamp,
    InterfaceName,
    IntegrationKey,
    Status,
    #[serde(rename = "executionTimeMs", alias = "executionTime")]
    ExecutionTime,
    RecordsProcessed,
    RetryCount,
    SourceSystem,
    TargetSystem,
    BatchId,
}

impl SortField {
    pub const ALL: [SortField; 10] = [
        SortField::Timestamp,
        SortField::InterfaceName,
        SortField::IntegrationKey,
        SortField::Status,
        SortField::ExecutionTime,
        SortField::RecordsProcessed,
        SortField::RetryCount,
        SortField::SourceSystem,
        SortField::TargetSystem,
        SortField::BatchId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Timestamp => "timestamp",
            SortField::InterfaceName => "interfaceName",
            SortField::IntegrationKey => "integrationKey",
            SortField::Status => "status",
            SortField::ExecutionTime => "executionTimeMs",
            SortField::RecordsProcessed => "recordsProcessed",
            SortField::RetryCount => "retryCount",
            SortField::SourceSystem => "sourceSystem",
            SortField::TargetSystem => "targetSystem",
            SortField::BatchId => "batchId",
        }
    }

    /// Compare two records by this field, ascending
    pub fn compare(&self, a: &ExecutionLog, b: &ExecutionLog) -> Ordering {
        match self {
            SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortField::InterfaceName => a.interface_name.cmp(&b.interface_name),
            SortField::IntegrationKey => a.integration_key.cmp(&b.integration_key),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::ExecutionTime => a.execution_time_ms.cmp(&b.execution_time_ms),
            SortField::RecordsProcessed => a.records_processed.cmp(&b.records_processed),
            SortField::RetryCount => a.retry_count.cmp(&b.retry_count),
            SortField::SourceSystem => a.source_system.cmp(&b.source_system),
            SortField::TargetSystem => a.target_system.cmp(&b.target_system),
            SortField::BatchId => a.batch_id.cmp(&b.batch_id),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "executionTime" {
            return Ok(SortField::ExecutionTime);
        }
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
                format!("Cannot sort by '{}' (allowed: {})", s, allowed.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` sorts ascending; anything else (including nothing) descending
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Store convention: 1 ascending, -1 descending
    pub fn direction(&self) -> i8 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Single-field sort; defaults to newest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn compare(&self, a: &ExecutionLog, b: &ExecutionLog) -> Ordering {
        let ord = self.field.compare(a, b);
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// A validated log-browser request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub window: TimeWindow,
    /// Exact status match; `None` matches all
    pub status: Option<ExecutionStatus>,
    /// Case-insensitive substring on `interfaceName`
    pub interface_name: Option<String>,
    /// Case-insensitive substring on `integrationKey`
    pub integration_key: Option<String>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl QueryFilter {
    /// Match-all filter over `window` with default sort and paging
    pub fn for_window(window: TimeWindow) -> Self {
        Self {
            window,
            status: None,
            interface_name: None,
            integration_key: None,
            sort: SortSpec::default(),
            page: PageRequest::default(),
        }
    }

    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_interface_name(mut self, needle: impl Into<String>) -> Self {
        self.interface_name = non_empty(needle.into());
        self
    }

    pub fn with_integration_key(mut self, needle: impl Into<String>) -> Self {
        self.integration_key = non_empty(needle.into());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
