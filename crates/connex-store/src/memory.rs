//! In-memory LogStore

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use connex_core::{
    DistinctField, ExecutionLog, ExecutionStats, Group, GroupId, GroupKey, LogFilter, LogQuery,
    LogStore, NewExecutionLog, StoreError, StoreResult,
};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Execution logs held in insertion order behind a read-write lock.
///
/// Each call takes the lock once, so single-record and single-batch writes
/// are atomic with respect to readers.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ExecutionLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn accept(log: NewExecutionLog) -> StoreResult<ExecutionLog> {
        log.check()
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        Ok(log.into_record(Uuid::new_v4().to_string(), Utc::now()))
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn insert(&self, log: NewExecutionLog) -> StoreResult<ExecutionLog> {
        let record = Self::accept(log)?;
        self.records.write().push(record.clone());
        Ok(record)
    }

    async fn insert_many(&self, logs: Vec<NewExecutionLog>) -> StoreResult<u64> {
        // Reject the whole batch before taking the write lock
        let accepted = logs
            .into_iter()
            .map(Self::accept)
            .collect::<StoreResult<Vec<_>>>()?;

        let count = accepted.len() as u64;
        self.records.write().extend(accepted);
        Ok(count)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut records = self.records.write();
        let removed = records.len() as u64;
        records.clear();
        debug!(removed, "Cleared memory store");
        Ok(removed)
    }

    async fn find(&self, query: &LogQuery) -> StoreResult<Vec<ExecutionLog>> {
        let records = self.records.read();
        let mut matched: Vec<&ExecutionLog> =
            records.iter().filter(|r| query.filter.matches(r)).collect();

        // sort_by is stable, so ties keep insertion order
        matched.sort_by(|a, b| query.sort.compare(a, b));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &LogFilter) -> StoreResult<u64> {
        let records = self.records.read();
        Ok(records.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn distinct(&self, field: DistinctField) -> StoreResult<Vec<String>> {
        let records = self.records.read();
        let values: BTreeSet<&str> = records.iter().map(|r| field.value_of(r)).collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }

    async fn aggregate(&self, filter: &LogFilter, key: GroupKey) -> StoreResult<Vec<Group>> {
        let records = self.records.read();
        let mut groups: BTreeMap<GroupId, ExecutionStats> = BTreeMap::new();
        for record in records.iter().filter(|r| filter.matches(r)) {
            groups.entry(key.key_of(record)).or_default().record(record);
        }

        Ok(groups
            .into_iter()
            .map(|(id, stats)| Group { id, stats })
            .collect())
    }
}
