//! Execution log records
//!
//! One [`ExecutionLog`] is written per interface execution attempt. Records
//! are immutable once stored: there is no update path, only insert and a
//! full delete for reseeding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{CoreError, CoreResult};

/// Default `sourceSystem` when a producer omits it
pub const DEFAULT_SOURCE_SYSTEM: &str = "SAP SuccessFactors";

/// Outcome of one interface execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Pending,
    Warning,
}

impl ExecutionStatus {
    /// Every status, in the order summaries report them
    pub const ALL: [ExecutionStatus; 4] = [
        ExecutionStatus::Success,
        ExecutionStatus::Failed,
        ExecutionStatus::Pending,
        ExecutionStatus::Warning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Warning => "warning",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ExecutionStatus::Success),
            "failed" => Ok(ExecutionStatus::Failed),
            "pending" => Ok(ExecutionStatus::Pending),
            "warning" => Ok(ExecutionStatus::Warning),
            _ => Err(format!(
                "Unknown status '{}' (expected success, failed, pending or warning)",
                s
            )),
        }
    }
}

/// A stored execution log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLog {
    /// Store-assigned identifier
    pub id: String,
    /// Name of the interface (integration pipeline) that ran
    pub interface_name: String,
    /// Identifier of the configured connection/job within the interface
    pub integration_key: String,
    pub status: ExecutionStatus,
    pub message: String,
    /// When the execution happened
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration of the execution in milliseconds
    pub execution_time_ms: u64,
    pub records_processed: u64,
    /// Set on failed executions by convention (not enforced)
    #[serde(default)]
    pub error_code: Option<String>,
    pub retry_count: u32,
    pub source_system: String,
    pub target_system: String,
    pub batch_id: String,
    /// Open key-value metadata supplied by the producer
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// When the store accepted the record
    pub created_at: DateTime<Utc>,
}

/// An execution log as submitted by a producer, before the store accepts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExecutionLog {
    #[validate(length(min = 1, message = "interfaceName is required"))]
    pub interface_name: String,
    #[validate(length(min = 1, message = "integrationKey is required"))]
    pub integration_key: String,
    pub status: ExecutionStatus,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    /// Backfilled timestamp; the store stamps the write time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "executionTime")]
    pub execution_time_ms: u64,
    #[serde(default)]
    pub records_processed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_source_system")]
    pub source_system: String,
    #[serde(default)]
    pub target_system: String,
    #[serde(default)]
    pub batch_id: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_source_system() -> String {
    DEFAULT_SOURCE_SYSTEM.to_string()
}

impl NewExecutionLog {
    /// Create a record with the required fields; everything else defaulted
    pub fn new(
        interface_name: impl Into<String>,
        integration_key: impl Into<String>,
        status: ExecutionStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            interface_name: interface_name.into(),
            integration_key: integration_key.into(),
            status,
            message: message.into(),
            timestamp: None,
            execution_time_ms: 0,
            records_processed: 0,
            error_code: None,
            retry_count: 0,
            source_system: default_source_system(),
            target_system: String::new(),
            batch_id: String::new(),
            metadata: Map::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = ms;
        self
    }

    pub fn with_records_processed(mut self, count: u64) -> Self {
        self.records_processed = count;
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn with_target_system(mut self, target: impl Into<String>) -> Self {
        self.target_system = target.into();
        self
    }

    /// Check required fields
    pub fn check(&self) -> CoreResult<()> {
        self.validate().map_err(CoreError::from)
    }

    /// Turn the submission into a stored record.
    ///
    /// `now` becomes `createdAt`, and also `timestamp` unless one was backfilled.
    pub fn into_record(self, id: impl Into<String>, now: DateTime<Utc>) -> ExecutionLog {
        ExecutionLog {
            id: id.into(),
            interface_name: self.interface_name,
            integration_key: self.integration_key,
            status: self.status,
            message: self.message,
            timestamp: self.timestamp.unwrap_or(now),
            execution_time_ms: self.execution_time_ms,
            records_processed: self.records_processed,
            error_code: self.error_code,
            retry_count: self.retry_count,
            source_system: self.source_system,
            target_system: self.target_system,
            batch_id: self.batch_id,
            metadata: self.metadata,
            created_at: now,
        }
    }
}
