//! E2E tests for the HTTP surface
//!
//! Checks the raw JSON envelopes, status codes and headers the dashboard
//! relies on. Typed reads are covered by the connex-client tests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use connex_api::{create_router, ApiConfig, AppState, Environment};
use connex_client::testing::{wait_for, TestServer};
use connex_core::{
    DistinctField, ExecutionLog, ExecutionStatus, Group, GroupKey, LogFilter, LogQuery, LogStore,
    NewExecutionLog, StoreError, StoreResult,
};
use connex_store::MemoryStore;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Test Stores
// =============================================================================

/// Store whose every call fails as if the database were down
struct UnreachableStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait::async_trait]
impl LogStore for UnreachableStore {
    async fn ping(&self) -> StoreResult<()> {
        down()
    }

    async fn insert(&self, _log: NewExecutionLog) -> StoreResult<ExecutionLog> {
        down()
    }

    async fn insert_many(&self, _logs: Vec<NewExecutionLog>) -> StoreResult<u64> {
        down()
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        down()
    }

    async fn find(&self, _query: &LogQuery) -> StoreResult<Vec<ExecutionLog>> {
        down()
    }

    async fn count(&self, _filter: &LogFilter) -> StoreResult<u64> {
        down()
    }

    async fn distinct(&self, _field: DistinctField) -> StoreResult<Vec<String>> {
        down()
    }

    async fn aggregate(&self, _filter: &LogFilter, _key: GroupKey) -> StoreResult<Vec<Group>> {
        down()
    }
}

/// Memory store whose reads stall for `delay`
struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait::async_trait]
impl LogStore for SlowStore {
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
        tokio::time::sleep(self.delay).await;
        self.inner.find(query).await
    }

    async fn count(&self, filter: &LogFilter) -> StoreResult<u64> {
        tokio::time::sleep(self.delay).await;
        self.inner.count(filter).await
    }

    async fn distinct(&self, field: DistinctField) -> StoreResult<Vec<String>> {
        tokio::time::sleep(self.delay).await;
        self.inner.distinct(field).await
    }

    async fn aggregate(&self, filter: &LogFilter, key: GroupKey) -> StoreResult<Vec<Group>> {
        tokio::time::sleep(self.delay).await;
        self.inner.aggregate(filter, key).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn start(store: Arc<dyn LogStore>, config: ApiConfig) -> TestServer {
    TestServer::start(create_router(AppState::new(store, config)))
        .await
        .expect("Failed to start test server")
}

async fn get(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = reqwest::get(format!("{}{}", server.base_url(), path))
        .await
        .unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

async fn seeded_store(count: usize) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    let logs = (0..count)
        .map(|i| {
            NewExecutionLog::new("Workday-HR-Sync", "INT_WD", ExecutionStatus::Success, "ok")
                .with_timestamp(now - chrono::Duration::minutes(i as i64))
        })
        .collect();
    store.insert_many(logs).await.unwrap();
    store
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_root_lists_endpoints() {
    let server = start(Arc::new(MemoryStore::new()), ApiConfig::default()).await;
    let (status, body) = get(&server, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ConnexView API");
    assert_eq!(body["status"], "running");
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.contains(&json!("GET /api/v1/dashboard/summary")));
}

#[tokio::test]
async fn test_unknown_route_envelope() {
    let server = start(Arc::new(MemoryStore::new()), ApiConfig::default()).await;
    let (status, body) = get(&server, "/api/v1/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Route /api/v1/nope not found");
    assert!(body["availableEndpoints"].as_array().unwrap().len() >= 11);
}

#[tokio::test]
async fn test_unversioned_prefix_and_logs_alias() {
    let server = start(seeded_store(3).await, ApiConfig::default()).await;

    let (status, legacy) = get(&server, "/api/interfaces/logs").await;
    assert_eq!(status, StatusCode::OK);
    let (_, alias) = get(&server, "/api/v1/dashboard/logs").await;

    assert_eq!(legacy["pagination"]["totalCount"], 3);
    assert_eq!(alias["pagination"]["totalCount"], 3);
    assert_eq!(legacy["logs"], alias["logs"]);
}

// =============================================================================
// Parameter handling
// =============================================================================

#[tokio::test]
async fn test_out_of_range_paging_is_clamped() {
    let server = start(seeded_store(3).await, ApiConfig::default()).await;
    let (status, body) = get(&server, "/api/v1/interfaces/logs?page=-3&limit=5000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["limit"], 1000);

    let (_, body) = get(&server, "/api/v1/interfaces/logs?page=abc&limit=0").await;
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["limit"], 1);
    assert_eq!(body["pagination"]["totalPages"], 3);

    let (_, body) = get(&server, "/api/v1/interfaces/logs?limit=ten").await;
    assert_eq!(body["pagination"]["limit"], 10);
}

#[tokio::test]
async fn test_default_sort_is_newest_first() {
    let server = start(seeded_store(4).await, ApiConfig::default()).await;
    let (_, body) = get(&server, "/api/v1/interfaces/logs").await;

    let stamps: Vec<&str> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["timestamp"].as_str().unwrap())
        .collect();
    let mut sorted = stamps.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(stamps, sorted);
    assert_eq!(body["filters"]["sortBy"], "timestamp");
    assert_eq!(body["filters"]["sortOrder"], "desc");
}

#[tokio::test]
async fn test_invalid_status_is_rejected_with_details() {
    let server = start(Arc::new(MemoryStore::new()), ApiConfig::default()).await;
    let (status, body) = get(&server, "/api/v1/interfaces/logs?status=exploded").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "bad_request");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_malformed_query_string_uses_json_envelope() {
    let server = start(Arc::new(MemoryStore::new()), ApiConfig::default()).await;

    for path in [
        "/api/v1/interfaces/logs?page=1&page=2",
        "/api/v1/dashboard/summary?timeRange=24h&timeRange=7d",
        "/api/v1/dashboard/performance?startDate=a&startDate=b",
    ] {
        let response = reqwest::get(format!("{}{}", server.base_url(), path))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "{}", path);
        let content_type = response.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("application/json"), "{}", path);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("duplicate field"));
    }
}

#[tokio::test]
async fn test_unknown_sort_field_falls_back_to_timestamp() {
    let server = start(seeded_store(3).await, ApiConfig::default()).await;
    let (status, body) = get(
        &server,
        "/api/v1/interfaces/logs?sortBy=password&sortOrder=asc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filters"]["sortBy"], "timestamp");
    assert_eq!(body["filters"]["sortOrder"], "asc");
    let stamps: Vec<&str> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["timestamp"].as_str().unwrap())
        .collect();
    let mut sorted = stamps.clone();
    sorted.sort_unstable();
    assert_eq!(stamps, sorted);
}

#[tokio::test]
async fn test_custom_range_bounds() {
    let server = start(seeded_store(5).await, ApiConfig::default()).await;

    let start_date = (Utc::now() - chrono::Duration::minutes(90)).to_rfc3339();
    let url = format!(
        "/api/v1/interfaces/logs?timeRange=custom&startDate={}",
        urlencode(&start_date)
    );
    let (status, body) = get(&server, &url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["totalCount"], 5);
    assert_eq!(body["filters"]["timeRange"], "custom");

    let (status, _) = get(
        &server,
        "/api/v1/interfaces/logs?timeRange=custom&startDate=2024-02-01T00:00:00Z&endDate=2024-01-01T00:00:00Z",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn urlencode(value: &str) -> String {
    value.replace('+', "%2B").replace(':', "%3A")
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_post_log_returns_created() {
    let server = start(Arc::new(MemoryStore::new()), ApiConfig::default()).await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/v1/interfaces/logs", server.base_url());

    let response = http
        .post(&url)
        .json(&json!({
            "interfaceName": "SAP-SF-Payroll-Integration",
            "integrationKey": "INT_PAY",
            "status": "failed",
            "message": "Target system rejected batch",
            "executionTime": 2500,
            "errorCode": "ERR_TIMEOUT"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["log"]["executionTimeMs"], 2500);
    assert_eq!(body["log"]["sourceSystem"], "SAP SuccessFactors");
    assert!(body["log"]["id"].is_string());

    let response = http
        .post(&url)
        .json(&json!({ "interfaceName": "x", "status": "success" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_add_more_accepts_numeric_string() {
    let store = Arc::new(MemoryStore::new());
    let server = start(store.clone(), ApiConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/data/add-more", server.base_url()))
        .json(&json!({ "count": "25" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["recordsAdded"], 25);
    assert_eq!(body["message"], "Added 25 new records successfully");
    assert_eq!(store.len(), 25);
}

// =============================================================================
// Failure mapping
// =============================================================================

#[tokio::test]
async fn test_store_outage() {
    let server = start(Arc::new(UnreachableStore), ApiConfig::default()).await;

    let (status, body) = get(&server, "/api/v1/dashboard/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));

    let (status, body) = get(&server, "/api/v1/dashboard/summary").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to fetch dashboard summary");
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let store = Arc::new(SlowStore {
        inner: MemoryStore::new(),
        delay: Duration::from_millis(500),
    });
    let config = ApiConfig {
        store_timeout_ms: 50,
        ..ApiConfig::default()
    };
    let server = start(store, config).await;

    let (status, body) = get(&server, "/api/v1/interfaces/names").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_rate_limit_headers() {
    let mut config = ApiConfig::default();
    config.rate_limit.max_requests = 1;
    let server = start(Arc::new(MemoryStore::new()), config).await;

    let first = reqwest::get(format!("{}/", server.base_url())).await.unwrap();
    assert_eq!(first.status().as_u16(), 200);

    let second = reqwest::get(format!("{}/", server.base_url())).await.unwrap();
    assert_eq!(second.status().as_u16(), 429);
    let retry_after: u64 = second
        .headers()
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["retryAfter"], retry_after);
    assert_eq!(body["error"], "too_many_requests");
}

#[tokio::test]
async fn test_sweeper_prunes_expired_clients() {
    let mut config = ApiConfig::default();
    config.rate_limit.window_secs = 1;
    config.rate_limit.sweep_interval_secs = 1;
    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    let limiter = Arc::clone(&state.rate_limiter);
    let sweeper = limiter.spawn_sweeper(state.config.rate_limit.sweep_interval());
    let server = TestServer::start(create_router(state)).await.unwrap();

    let response = reqwest::get(format!("{}/", server.base_url())).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(limiter.tracked_clients(), 1);

    let limiter_ref = &limiter;
    let pruned = wait_for(
        || async move { limiter_ref.tracked_clients() == 0 },
        Duration::from_secs(5),
    )
    .await;
    sweeper.abort();
    assert!(pruned);
}

#[tokio::test]
async fn test_production_omits_details() {
    let config = ApiConfig {
        environment: Environment::Production,
        ..ApiConfig::default()
    };
    let app = create_router(AppState::new(Arc::new(UnreachableStore), config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/interfaces/names")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Failed to fetch interface names");
    assert!(body.get("details").is_none());
}
