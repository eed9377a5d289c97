//! Sample data generation and reseeding
//!
//! Reseeding deletes every record and then inserts fresh samples in
//! sequential fixed-size batches. The two phases are not atomic: readers
//! may see an empty or partially filled store while a reseed runs, and a
//! failure part-way leaves the batches inserted so far in place. Retrying
//! the whole reseed is always safe.

use chrono::{DateTime, Duration, Utc};
use connex_core::{
    summary, ExecutionStatus, LogStore, NewExecutionLog, StoreResult, SummaryStats, TimeRange,
    TimeWindow,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const DEFAULT_SEED_COUNT: usize = 50_000;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_ADD_COUNT: usize = 1_000;
/// Sample timestamps are spread over this many days before now
pub const SEED_SPAN_DAYS: i64 = 30;

const INTERFACE_NAMES: &[&str] = &[
    "SAP-SF-Employee-Sync",
    "SAP-SF-Payroll-Integration",
    "SAP-SF-Benefits-Connector",
    "SAP-SF-Performance-Sync",
    "SAP-SF-Learning-Integration",
    "SAP-SF-Recruiting-Sync",
    "SAP-SF-Compensation-Sync",
    "SAP-SF-Time-Tracking",
    "SAP-SF-Organizational-Sync",
    "SAP-SF-Position-Management",
    "Third-Party-HRIS-Sync",
    "Workday-Integration",
    "ADP-Payroll-Connector",
    "BambooHR-Sync",
    "Greenhouse-Recruiting",
];

const INTEGRATION_KEYS: &[&str] = &[
    "SF_EMP_001",
    "SF_PAY_002",
    "SF_BEN_003",
    "SF_PERF_004",
    "SF_LEARN_005",
    "SF_REC_006",
    "SF_COMP_007",
    "SF_TIME_008",
    "SF_ORG_009",
    "SF_POS_010",
    "TP_HRIS_011",
    "WD_INT_012",
    "ADP_PAY_013",
    "BAMBOO_014",
    "GH_REC_015",
];

const TARGET_SYSTEMS: &[&str] = &[
    "SAP ECP",
    "SAP SuccessFactors",
    "Workday",
    "ADP Workforce",
    "BambooHR",
    "Greenhouse",
    "Oracle HCM",
    "Microsoft Dynamics",
    "Salesforce",
    "ServiceNow HR",
];

const SUCCESS_MESSAGES: &[&str] = &[
    "Employee data synchronized successfully",
    "Payroll records processed without errors",
    "Benefits enrollment updated successfully",
    "Performance data imported successfully",
    "Learning records synchronized",
    "Recruiting data processed successfully",
    "Compensation changes applied",
    "Time tracking data updated",
    "Organizational structure synchronized",
    "Position management completed",
    "Bulk import operation successful",
    "Real-time sync completed",
    "Scheduled batch job finished",
    "Data validation passed",
    "Integration test successful",
];

const ERROR_MESSAGES: &[&str] = &[
    "Connection timeout to SAP SuccessFactors",
    "Authentication failed - invalid credentials",
    "Data validation error: missing required fields",
    "API rate limit exceeded",
    "Database connection lost during transaction",
    "Invalid employee ID format detected",
    "Duplicate record found in target system",
    "Network connectivity issues",
    "Insufficient permissions for data access",
    "Data transformation failed",
    "Target system maintenance window",
    "SSL certificate validation failed",
    "JSON parsing error in response",
    "Foreign key constraint violation",
    "Maximum retry attempts exceeded",
];

const WARNING_MESSAGES: &[&str] = &[
    "Processing slower than expected",
    "Some records skipped due to validation warnings",
    "Partial success - 95% records processed",
    "Performance degradation detected",
    "High memory usage during processing",
    "API response time exceeding SLA",
    "Data quality issues found",
    "Temporary network latency detected",
    "Queue backlog increasing",
    "Cache hit ratio below threshold",
];

const PENDING_MESSAGES: &[&str] = &[
    "Queued for processing",
    "Waiting for approval",
    "Scheduled for next batch",
    "Pending data validation",
    "Awaiting system availability",
    "In processing queue",
    "Waiting for dependency completion",
    "Scheduled maintenance pending",
    "User confirmation required",
    "Batch job queued",
];

const ERROR_CODES: &[&str] = &[
    "CONN_TIMEOUT",
    "AUTH_FAILED",
    "VALIDATION_ERROR",
    "RATE_LIMIT",
    "DB_CONNECTION_LOST",
    "INVALID_FORMAT",
    "DUPLICATE_RECORD",
    "NETWORK_ERROR",
    "PERMISSION_DENIED",
    "TRANSFORM_FAILED",
    "MAINTENANCE_MODE",
    "SSL_ERROR",
    "PARSE_ERROR",
    "CONSTRAINT_VIOLATION",
    "RETRY_EXCEEDED",
];

const ENVIRONMENTS: &[&str] = &["PROD", "TEST", "DEV"];
const REGIONS: &[&str] = &["US-EAST", "US-WEST", "EU-CENTRAL", "ASIA-PACIFIC"];
const DATA_CENTERS: &[&str] = &["DC01", "DC02", "DC03"];

// =============================================================================
// Generator
// =============================================================================

/// Produces plausible execution logs for demos and load testing
pub struct SampleGenerator {
    rng: StdRng,
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// 75% success, 13% failed, 7% warning, 5% pending
    fn status(&mut self) -> ExecutionStatus {
        let roll: f64 = self.rng.gen();
        if roll < 0.75 {
            ExecutionStatus::Success
        } else if roll < 0.88 {
            ExecutionStatus::Failed
        } else if roll < 0.95 {
            ExecutionStatus::Warning
        } else {
            ExecutionStatus::Pending
        }
    }

    fn execution_time(&mut self, status: ExecutionStatus) -> u64 {
        match status {
            ExecutionStatus::Success => self.rng.gen_range(500..=5_000),
            // fails fast or times out
            ExecutionStatus::Failed => self.rng.gen_range(100..=30_000),
            ExecutionStatus::Warning => self.rng.gen_range(2_000..=15_000),
            ExecutionStatus::Pending => self.rng.gen_range(0..=1_000),
        }
    }

    fn records_processed(&mut self, status: ExecutionStatus) -> u64 {
        match status {
            ExecutionStatus::Success => self.rng.gen_range(1..=10_000),
            ExecutionStatus::Failed => self.rng.gen_range(0..=1_000),
            ExecutionStatus::Warning => self.rng.gen_range(500..=8_000),
            ExecutionStatus::Pending => 0,
        }
    }

    fn message(&mut self, status: ExecutionStatus) -> &'static str {
        match status {
            ExecutionStatus::Success => self.pick(SUCCESS_MESSAGES),
            ExecutionStatus::Failed => self.pick(ERROR_MESSAGES),
            ExecutionStatus::Warning => self.pick(WARNING_MESSAGES),
            ExecutionStatus::Pending => self.pick(PENDING_MESSAGES),
        }
    }

    fn metadata(&mut self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("version".into(), Value::from("2.0"));
        metadata.insert("environment".into(), Value::from(self.pick(ENVIRONMENTS)));
        metadata.insert("region".into(), Value::from(self.pick(REGIONS)));
        metadata.insert("dataCenter".into(), Value::from(self.pick(DATA_CENTERS)));
        metadata.insert(
            "processingNode".into(),
            Value::from(format!("NODE_{}", self.rng.gen_range(1..=10))),
        );
        metadata.insert(
            "correlationId".into(),
            Value::from(format!(
                "CORR_{}_{}",
                now.timestamp_millis(),
                self.rng.gen_range(1000..=9999)
            )),
        );
        metadata
    }

    /// One sample with a timestamp in the [`SEED_SPAN_DAYS`] before `now`
    pub fn generate_one(&mut self, now: DateTime<Utc>) -> NewExecutionLog {
        let status = self.status();
        let span_ms = Duration::days(SEED_SPAN_DAYS).num_milliseconds();
        let timestamp = now - Duration::milliseconds(self.rng.gen_range(0..=span_ms));

        let mut log = NewExecutionLog::new(
            self.pick(INTERFACE_NAMES),
            self.pick(INTEGRATION_KEYS),
            status,
            self.message(status),
        )
        .with_timestamp(timestamp)
        .with_execution_time(self.execution_time(status))
        .with_records_processed(self.records_processed(status))
        .with_target_system(self.pick(TARGET_SYSTEMS));

        if status == ExecutionStatus::Failed {
            log = log.with_error_code(self.pick(ERROR_CODES));
            log.retry_count = self.rng.gen_range(0..=3);
        }
        log.batch_id = format!(
            "BATCH_{}_{}",
            timestamp.format("%Y%m%d"),
            self.rng.gen_range(1000..=9999)
        );
        log.metadata = self.metadata(now);
        log
    }

    pub fn generate(&mut self, count: usize, now: DateTime<Utc>) -> Vec<NewExecutionLog> {
        (0..count).map(|_| self.generate_one(now)).collect()
    }
}

// =============================================================================
// Reseed / Append
// =============================================================================

/// Outcome of a full reseed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub records_inserted: u64,
    pub batches: usize,
    /// Summary over the last 30 days, taken right after inserting
    pub stats: SummaryStats,
}

/// Replace the store's contents with `count` fresh samples.
///
/// Samples are generated one batch at a time so peak memory stays at a
/// single batch.
pub async fn reseed(
    store: &dyn LogStore,
    generator: &mut SampleGenerator,
    count: usize,
    batch_size: usize,
) -> StoreResult<SeedReport> {
    let batch_size = batch_size.max(1);
    let batches = count.div_ceil(batch_size);
    info!(count, batch_size, batches, "Reseeding execution logs");

    let removed = store.delete_all().await?;
    debug!(removed, "Cleared existing execution logs");

    let now = Utc::now();
    let mut inserted = 0u64;
    for batch in 0..batches {
        let len = batch_size.min(count - batch * batch_size);
        inserted += store.insert_many(generator.generate(len, now)).await?;
        debug!(batch = batch + 1, batches, "Inserted batch");
    }

    let window = TimeWindow::named(TimeRange::Last30Days, now);
    let stats = summary::summarize(store, &window).await?;
    info!(
        inserted,
        success = stats.successful_executions,
        failed = stats.failed_executions,
        avg_ms = stats.avg_execution_time.round(),
        "Reseed complete"
    );

    Ok(SeedReport {
        records_inserted: inserted,
        batches,
        stats,
    })
}

/// Insert `count` more samples without touching existing records
pub async fn append(
    store: &dyn LogStore,
    generator: &mut SampleGenerator,
    count: usize,
) -> StoreResult<u64> {
    let added = store.insert_many(generator.generate(count, Utc::now())).await?;
    info!(added, "Appended sample execution logs");
    Ok(added)
}
