//! Running accumulators for grouped aggregation

use crate::models::{ExecutionLog, ExecutionStatus};

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Conditional counts and execution-time statistics over a set of records.
///
/// Stores fold records into this with [`ExecutionStats::record`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub count: u64,
    pub success: u64,
    pub failed: u64,
    pub pending: u64,
    pub warning: u64,
    pub total_execution_ms: u64,
    pub min_execution_ms: Option<u64>,
    pub max_execution_ms: Option<u64>,
    pub records_processed: u64,
}

impl ExecutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the accumulator
    pub fn record(&mut self, log: &ExecutionLog) {
        self.count += 1;
        match log.status {
            ExecutionStatus::Success => self.success += 1,
            ExecutionStatus::Failed => self.failed += 1,
            ExecutionStatus::Pending => self.pending += 1,
            ExecutionStatus::Warning => self.warning += 1,
        }
        self.total_execution_ms = self.total_execution_ms.saturating_add(log.execution_time_ms);
        self.records_processed = self.records_processed.saturating_add(log.records_processed);
        self.min_execution_ms = Some(
            self.min_execution_ms
                .map_or(log.execution_time_ms, |m| m.min(log.execution_time_ms)),
        );
        self.max_execution_ms = Some(
            self.max_execution_ms
                .map_or(log.execution_time_ms, |m| m.max(log.execution_time_ms)),
        );
    }

    /// Count for a single status
    pub fn status_count(&self, status: ExecutionStatus) -> u64 {
        match status {
            ExecutionStatus::Success => self.success,
            ExecutionStatus::Failed => self.failed,
            ExecutionStatus::Pending => self.pending,
            ExecutionStatus::Warning => self.warning,
        }
    }

    /// Mean execution time; 0 for an empty set
    pub fn avg_execution_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_execution_ms as f64 / self.count as f64
        }
    }

    /// Success percentage rounded to one decimal; 0 for an empty set
    pub fn success_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            round1(self.success as f64 / self.count as f64 * 100.0)
        }
    }
}

impl<'a> FromIterator<&'a ExecutionLog> for ExecutionStats {
    fn from_iter<I: IntoIterator<Item = &'a ExecutionLog>>(iter: I) -> Self {
        let mut stats = ExecutionStats::new();
        for log in iter {
            stats.record(log);
        }
        stats
    }
}
