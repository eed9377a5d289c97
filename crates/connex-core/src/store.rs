//! LogStore trait - the abstraction over execution-log record stores
//!
//! The store is a queryable collection. It knows nothing about time-range
//! tokens, pages or envelopes; callers hand it the store-native expressions
//! produced by [`crate::query`].

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};

use crate::aggregate::ExecutionStats;
use crate::error::StoreResult;
use crate::models::{ExecutionLog, ExecutionStatus, NewExecutionLog, SortSpec};

// =============================================================================
// Filter Expressions
// =============================================================================

/// Case-insensitive substring match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    needle: String,
}

impl TextMatch {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_lowercase(),
        }
    }

    /// The lowercased needle
    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }
}

/// Conjunction of field predicates; absent predicates match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Inclusive lower bound on `timestamp`
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `timestamp`
    pub until: Option<DateTime<Utc>>,
    pub status: Option<ExecutionStatus>,
    pub interface_name: Option<TextMatch>,
    pub integration_key: Option<TextMatch>,
}

impl LogFilter {
    /// Filter matching every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, log: &ExecutionLog) -> bool {
        if let Some(since) = self.since {
            if log.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if log.timestamp >= until {
                return false;
            }
        }
        if let Some(status) = self.status {
            if log.status != status {
                return false;
            }
        }
        if let Some(m) = &self.interface_name {
            if !m.matches(&log.interface_name) {
                return false;
            }
        }
        if let Some(m) = &self.integration_key {
            if !m.matches(&log.integration_key) {
                return false;
            }
        }
        true
    }
}

/// Filter plus sort and skip/limit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub filter: LogFilter,
    pub sort: SortSpec,
    pub skip: u64,
    /// `None` returns every matching record
    pub limit: Option<u64>,
}

// =============================================================================
// Grouped Aggregation
// =============================================================================

/// Fields with distinct-value extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctField {
    InterfaceName,
    IntegrationKey,
}

impl DistinctField {
    pub fn value_of<'a>(&self, log: &'a ExecutionLog) -> &'a str {
        match self {
            DistinctField::InterfaceName => &log.interface_name,
            DistinctField::IntegrationKey => &log.integration_key,
        }
    }
}

/// How records are bucketed for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// A single bucket over all matched records
    All,
    Status,
    /// UTC hour of day and interface name
    HourAndInterface,
}

impl GroupKey {
    /// Bucket identifier for one record
    pub fn key_of(&self, log: &ExecutionLog) -> GroupId {
        match self {
            GroupKey::All => GroupId::All,
            GroupKey::Status => GroupId::Status(log.status),
            GroupKey::HourAndInterface => GroupId::HourAndInterface {
                hour: log.timestamp.hour(),
                interface_name: log.interface_name.clone(),
            },
        }
    }
}

/// Identifier of one aggregation bucket
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupId {
    All,
    Status(ExecutionStatus),
    HourAndInterface { hour: u32, interface_name: String },
}

/// One aggregation bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub stats: ExecutionStats,
}

// =============================================================================
// LogStore Trait
// =============================================================================

/// Record store operations required by the engines and the API.
///
/// Implementations must be safe to share across request tasks. Only
/// single-record writes are atomic; `delete_all` followed by `insert_many`
/// is observable as two separate steps.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Connectivity probe (default: always reachable)
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Store one record, assigning `id` and `createdAt`
    async fn insert(&self, log: NewExecutionLog) -> StoreResult<ExecutionLog>;

    /// Store a batch, returning how many records were written
    async fn insert_many(&self, logs: Vec<NewExecutionLog>) -> StoreResult<u64>;

    /// Remove every record, returning how many were removed
    async fn delete_all(&self) -> StoreResult<u64>;

    /// Matching records in sort order, after skip/limit.
    ///
    /// Records comparing equal under the sort keep insertion order.
    async fn find(&self, query: &LogQuery) -> StoreResult<Vec<ExecutionLog>>;

    /// Number of matching records
    async fn count(&self, filter: &LogFilter) -> StoreResult<u64>;

    /// Distinct values of `field`, sorted ascending
    async fn distinct(&self, field: DistinctField) -> StoreResult<Vec<String>>;

    /// Grouped statistics over matching records, sorted by group id.
    ///
    /// Buckets with no records are not returned.
    async fn aggregate(&self, filter: &LogFilter, key: GroupKey) -> StoreResult<Vec<Group>>;
}
