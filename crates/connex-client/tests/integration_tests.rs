//! Integration tests for connex-client
//!
//! These tests spin up a real ConnexView server over an in-memory store and
//! drive it through the client, keeping the two in sync.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use connex_api::{create_router, ApiConfig, AppState};
use connex_client::testing::TestServer;
use connex_client::{ConnexClient, ConnexClientError, Dashboard, LogsParams};
use connex_core::{
    DistinctField, ExecutionLog, ExecutionStatus, Group, GroupKey, LogFilter, LogQuery, LogStore,
    NewExecutionLog, StoreResult,
};
use connex_store::MemoryStore;
use pretty_assertions::assert_eq;

// =============================================================================
// Counting Store
// =============================================================================

/// Memory store that counts read queries
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
}

impl CountingStore {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LogStore for CountingStore {
    async fn insert(&self, log: NewExecutionLog) -> StoreResult<ExecutionLog> {
        self.inner.insert(log).await
    }

    async fn insert_many(&self, logs: Vec<NewExecutionLog>) -> StoreResult<u64> {
        self.inner.insert_many(logs).await
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        self.inner.delete_all().await
    }

    async fn find(&self, query: &LogQuery) -> StoreResult<Vec<ExecutionLog>> {
        self.hit();
        self.inner.find(query).await
    }

    async fn count(&self, filter: &LogFilter) -> StoreResult<u64> {
        self.hit();
        self.inner.count(filter).await
    }

    async fn distinct(&self, field: DistinctField) -> StoreResult<Vec<String>> {
        self.hit();
        self.inner.distinct(field).await
    }

    async fn aggregate(&self, filter: &LogFilter, key: GroupKey) -> StoreResult<Vec<Group>> {
        self.hit();
        self.inner.aggregate(filter, key).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn execution(name: &str, key: &str, status: ExecutionStatus) -> NewExecutionLog {
    NewExecutionLog::new(name, key, status, "Run finished")
        .with_timestamp(Utc::now())
        .with_execution_time(1_500)
        .with_records_processed(40)
}

async fn server_with(store: Arc<dyn LogStore>, config: ApiConfig) -> TestServer {
    TestServer::start(create_router(AppState::new(store, config)))
        .await
        .expect("Failed to start test server")
}

async fn insert_all(store: &dyn LogStore, logs: Vec<NewExecutionLog>) {
    store.insert_many(logs).await.unwrap();
}

// =============================================================================
// Dashboard reads
// =============================================================================

#[tokio::test]
async fn test_summary_counts_each_status() {
    let store = Arc::new(MemoryStore::new());
    insert_all(
        store.as_ref(),
        [
            ExecutionStatus::Success,
            ExecutionStatus::Success,
            ExecutionStatus::Failed,
            ExecutionStatus::Warning,
            ExecutionStatus::Pending,
        ]
        .into_iter()
        .map(|s| execution("SAP-SF-Employee-Sync", "INT_EMP_SYNC", s))
        .collect(),
    )
    .await;

    let server = server_with(store, ApiConfig::default()).await;
    let response = server.client.summary("1h").await.unwrap();

    assert_eq!(response.time_range, "1h");
    let summary = response.summary;
    assert_eq!(summary.total_executions, 5);
    assert_eq!(summary.successful_executions, 2);
    assert_eq!(summary.failed_executions, 1);
    assert_eq!(summary.warning_executions, 1);
    assert_eq!(summary.pending_executions, 1);
    assert_eq!(summary.success_rate, 40.0);
    assert_eq!(summary.avg_execution_time, 1_500.0);
    assert_eq!(summary.total_records_processed, 200);

    // Nothing in the previous hour, so every count rose from zero
    assert_eq!(response.trends.total_change, 100.0);
}

#[tokio::test]
async fn test_summary_accepts_ui_labels() {
    let server = server_with(Arc::new(MemoryStore::new()), ApiConfig::default()).await;

    let response = server.client.summary("Last 7 days").await.unwrap();
    assert_eq!(response.time_range, "7d");
    assert_eq!(response.summary.total_executions, 0);
    assert_eq!(response.summary.avg_execution_time, 0.0);
}

#[tokio::test]
async fn test_third_page_of_twenty_five() {
    let store = Arc::new(MemoryStore::new());
    insert_all(
        store.as_ref(),
        (0..25)
            .map(|i| execution(&format!("Interface-{:02}", i), "INT", ExecutionStatus::Success))
            .collect(),
    )
    .await;

    let server = server_with(store, ApiConfig::default()).await;
    let page = server
        .client
        .logs(&LogsParams {
            page: 3,
            limit: 10,
            ..LogsParams::default()
        })
        .await
        .unwrap();

    assert_eq!(page.logs.len(), 5);
    assert_eq!(page.pagination.current_page, 3);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.total_count, 25);
    assert!(!page.pagination.has_next_page);
    assert!(page.pagination.has_prev_page);
}

#[tokio::test]
async fn test_interface_filter_is_case_insensitive_substring() {
    let store = Arc::new(MemoryStore::new());
    insert_all(
        store.as_ref(),
        vec![
            execution("SAP-SF-Payroll-Integration", "INT_PAY", ExecutionStatus::Success),
            execution("ADP-Payroll-Connector", "INT_ADP", ExecutionStatus::Failed),
            execution("SAP-SF-Employee-Sync", "INT_EMP", ExecutionStatus::Success),
        ],
    )
    .await;

    let server = server_with(store, ApiConfig::default()).await;
    let page = server
        .client
        .logs(&LogsParams {
            interface_name: "payroll".to_string(),
            sort_by: "interfaceName".to_string(),
            sort_order: "asc".to_string(),
            ..LogsParams::default()
        })
        .await
        .unwrap();

    let names: Vec<_> = page.logs.iter().map(|l| l.interface_name.as_str()).collect();
    assert_eq!(names, vec!["ADP-Payroll-Connector", "SAP-SF-Payroll-Integration"]);
    assert_eq!(page.filters.interface_name.as_deref(), Some("payroll"));
    assert_eq!(page.filters.sort_by, "interfaceName");
}

#[tokio::test]
async fn test_status_filter_and_distinct_lists() {
    let store = Arc::new(MemoryStore::new());
    insert_all(
        store.as_ref(),
        vec![
            execution("Workday-HR-Sync", "INT_WD", ExecutionStatus::Failed),
            execution("ADP-Payroll-Connector", "INT_ADP", ExecutionStatus::Success),
            execution("ADP-Payroll-Connector", "INT_ADP", ExecutionStatus::Failed),
        ],
    )
    .await;

    let server = server_with(store, ApiConfig::default()).await;
    let failed = server
        .client
        .logs(&LogsParams {
            status: Some(ExecutionStatus::Failed),
            ..LogsParams::default()
        })
        .await
        .unwrap();
    assert_eq!(failed.pagination.total_count, 2);
    assert!(failed.logs.iter().all(|l| l.status == ExecutionStatus::Failed));

    assert_eq!(
        server.client.interface_names().await.unwrap(),
        vec!["ADP-Payroll-Connector", "Workday-HR-Sync"]
    );
    assert_eq!(
        server.client.integration_keys().await.unwrap(),
        vec!["INT_ADP", "INT_WD"]
    );
}

#[tokio::test]
async fn test_realtime_and_performance() {
    let store = Arc::new(MemoryStore::new());
    let ts = Utc::now();
    insert_all(
        store.as_ref(),
        vec![
            execution("Workday-HR-Sync", "INT_WD", ExecutionStatus::Success).with_timestamp(ts),
            execution("Workday-HR-Sync", "INT_WD", ExecutionStatus::Failed).with_timestamp(ts),
        ],
    )
    .await;

    let server = server_with(store, ApiConfig::default()).await;

    let realtime = server.client.realtime().await.unwrap();
    assert_eq!(realtime.recent_logs.len(), 2);
    assert_eq!(realtime.time_window, "5 minutes");
    let total: u64 = realtime.status_counts.iter().map(|c| c.count).sum();
    assert_eq!(total, 2);

    let performance = server.client.performance("24h").await.unwrap();
    assert_eq!(performance.performance_data.len(), 1);
    let row = &performance.performance_data[0];
    assert_eq!(row.interface_name, "Workday-HR-Sync");
    assert_eq!(row.execution_count, 2);
    assert_eq!(row.success_count, 1);
    assert_eq!(row.failure_count, 1);
}

#[tokio::test]
async fn test_empty_window_has_no_performance_rows() {
    let server = server_with(Arc::new(MemoryStore::new()), ApiConfig::default()).await;
    let performance = server.client.performance("30d").await.unwrap();
    assert!(performance.performance_data.is_empty());
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_recorded_log_is_returned_once() {
    let server = server_with(Arc::new(MemoryStore::new()), ApiConfig::default()).await;

    let created = server
        .client
        .record_log(&execution(
            "SuccessFactors-LMS",
            "INT_LMS",
            ExecutionStatus::Warning,
        ))
        .await
        .unwrap();
    assert!(!created.id.is_empty());

    let page = server.client.logs(&LogsParams::default()).await.unwrap();
    assert_eq!(page.logs.len(), 1);
    assert_eq!(page.logs[0].id, created.id);
}

#[tokio::test]
async fn test_invalid_log_is_rejected() {
    let server = server_with(Arc::new(MemoryStore::new()), ApiConfig::default()).await;

    let err = server
        .client
        .record_log(&NewExecutionLog::new("", "INT", ExecutionStatus::Success, "m"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConnexClientError::ServerError { status: 400, .. }));
}

#[tokio::test]
async fn test_seed_and_add_more() {
    let mut config = ApiConfig::default();
    config.seed.record_count = 250;
    config.seed.batch_size = 100;
    config.seed.max_add_count = 500;

    let store = Arc::new(MemoryStore::new());
    insert_all(
        store.as_ref(),
        vec![execution("Old-Interface", "INT_OLD", ExecutionStatus::Success)],
    )
    .await;
    let server = server_with(store.clone(), config).await;

    let seeded = server.client.seed().await.unwrap();
    assert_eq!(seeded.records_inserted, 250);
    assert_eq!(seeded.stats.total_executions, 250);
    assert_eq!(store.len(), 250);

    let added = server.client.add_more(Some(40)).await.unwrap();
    assert_eq!(added.records_added, 40);
    assert_eq!(store.len(), 290);

    let err = server.client.add_more(Some(501)).await.unwrap_err();
    assert!(matches!(err, ConnexClientError::ServerError { status: 400, .. }));
}

#[tokio::test]
async fn test_health_reports_record_count() {
    let store = Arc::new(MemoryStore::new());
    insert_all(
        store.as_ref(),
        vec![execution("Workday-HR-Sync", "INT_WD", ExecutionStatus::Success)],
    )
    .await;
    let server = server_with(store, ApiConfig::default()).await;

    let health = server.client.health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.database.total_records, 1);
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_identical_reads_hit_store_once() {
    let store = Arc::new(CountingStore::default());
    insert_all(
        store.as_ref(),
        vec![execution("Workday-HR-Sync", "INT_WD", ExecutionStatus::Success)],
    )
    .await;
    let server = server_with(store.clone(), ApiConfig::default()).await;

    let params = LogsParams::default();
    let first = server.client.logs(&params).await.unwrap();
    let reads_after_first = store.reads();
    assert!(reads_after_first > 0);

    let second = server.client.logs(&params).await.unwrap();
    assert_eq!(store.reads(), reads_after_first);
    assert_eq!(first, second);

    let key = connex_client::cache::cache_key("/interfaces/logs", &params.to_pairs());
    assert!(server.client.cache().lookup(&key).await.is_some());

    // A different page is a different key
    server
        .client
        .logs(&LogsParams {
            page: 2,
            ..LogsParams::default()
        })
        .await
        .unwrap();
    assert!(store.reads() > reads_after_first);
}

#[tokio::test]
async fn test_writes_do_not_invalidate_cache() {
    let store = Arc::new(CountingStore::default());
    let server = server_with(store.clone(), ApiConfig::default()).await;

    assert!(server.client.interface_names().await.unwrap().is_empty());
    server
        .client
        .record_log(&execution("Workday-HR-Sync", "INT_WD", ExecutionStatus::Success))
        .await
        .unwrap();

    // Still served from cache
    assert!(server.client.interface_names().await.unwrap().is_empty());

    server.client.clear_cache();
    assert_eq!(
        server.client.interface_names().await.unwrap(),
        vec!["Workday-HR-Sync"]
    );
}

#[tokio::test]
async fn test_expired_entries_are_refetched() {
    let store = Arc::new(CountingStore::default());
    let server = server_with(store.clone(), ApiConfig::default()).await;
    let client = server.client.clone().with_cache_ttl(Duration::from_millis(50));

    client.interface_names().await.unwrap();
    let reads = store.reads();
    client.interface_names().await.unwrap();
    assert_eq!(store.reads(), reads);

    tokio::time::sleep(Duration::from_millis(80)).await;
    client.interface_names().await.unwrap();
    assert_eq!(store.reads(), reads + 1);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_rate_limit_surfaces_retry_after() {
    let mut config = ApiConfig::default();
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_secs = 60;
    let server = server_with(Arc::new(MemoryStore::new()), config).await;

    server.client.health().await.unwrap();
    server.client.health().await.unwrap();
    let err = server.client.health().await.unwrap_err();
    match err {
        ConnexClientError::RateLimited { retry_after } => {
            assert!(retry_after >= 1 && retry_after <= 60)
        }
        other => panic!("expected rate limit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_sort_field_is_echoed_as_timestamp() {
    let server = server_with(Arc::new(MemoryStore::new()), ApiConfig::default()).await;
    let page = server
        .client
        .logs(&LogsParams {
            sort_by: "password".to_string(),
            ..LogsParams::default()
        })
        .await
        .unwrap();
    assert_eq!(page.filters.sort_by, "timestamp");
    assert_eq!(page.filters.sort_order, "desc");
}

// =============================================================================
// Dashboard façade
// =============================================================================

#[tokio::test]
async fn test_dashboard_degrades_when_server_is_down() {
    // Bind and release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ConnexClient::with_config(
        &format!("http://{}", addr),
        Duration::from_millis(500),
        Duration::from_millis(200),
    )
    .unwrap();
    let mut dashboard = Dashboard::new(client);

    let data = dashboard.dashboard_data("Last 24 hours").await;
    assert_eq!(data.summary.total_executions, 0);
    assert!(data.performance.is_empty());
    assert!(dashboard.realtime().await.recent_logs.is_empty());
    assert!(dashboard.interface_names().await.is_empty());

    let view = dashboard.logs().await;
    assert!(view.logs.is_empty());
    assert!(view.pagination.is_none());

    // Writes and the health probe report the failure
    assert!(dashboard.health().await.is_err());
    assert!(dashboard.add_more(Some(1)).await.is_err());
}

#[tokio::test]
async fn test_dashboard_pulls_back_stale_page() {
    let store = Arc::new(MemoryStore::new());
    insert_all(
        store.as_ref(),
        (0..12)
            .map(|_| execution("Workday-HR-Sync", "INT_WD", ExecutionStatus::Success))
            .collect(),
    )
    .await;
    let server = server_with(store, ApiConfig::default()).await;

    let mut dashboard = Dashboard::new(server.client.clone());
    dashboard.filters_mut().set_page(7);

    let view = dashboard.logs().await;
    assert_eq!(dashboard.filters().page(), 2);
    assert_eq!(view.logs.len(), 2);
    assert_eq!(view.pages, vec![1, 2]);
}

#[tokio::test]
async fn test_dashboard_seed_keeps_cached_panels_until_refresh() {
    let mut config = ApiConfig::default();
    config.seed.record_count = 30;
    let server = server_with(Arc::new(MemoryStore::new()), config).await;
    let dashboard = Dashboard::new(server.client.clone());

    assert!(dashboard.interface_names().await.is_empty());
    assert!(!server.client.cache().is_empty().await);

    dashboard.seed().await.unwrap();
    dashboard.add_more(Some(5)).await.unwrap();
    assert!(!server.client.cache().is_empty().await);
    assert!(dashboard.interface_names().await.is_empty());

    dashboard.refresh();
    assert!(!dashboard.interface_names().await.is_empty());
}
