//! ConnexView HTTP client implementation

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use connex_core::{ExecutionLog, NewExecutionLog};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::cache::{cache_key, ResponseCache, DEFAULT_TTL};
use crate::error::{ConnexClientError, Result};
use crate::time_range::normalize;
use crate::types::*;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const API_PREFIX: &str = "/api/v1";

/// ConnexView REST API client
///
/// Read endpoints go through a shared TTL cache; clones share it too.
/// Writes, seeding and the health probe always reach the server.
#[derive(Debug, Clone)]
pub struct ConnexClient {
    client: Client,
    base_url: Url,
    cache: Arc<ResponseCache>,
}

impl ConnexClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the ConnexView server (e.g., "http://localhost:8000")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with custom timeouts
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url,
            cache: Arc::new(ResponseCache::new(DEFAULT_TTL)),
        })
    }

    /// Replace the response cache with an empty one using `ttl`
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(ResponseCache::new(ttl));
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The response cache shared by this client and its clones
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // =========================================================================
    // Health Check
    // =========================================================================

    /// Probe server and store health; never cached
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("/dashboard/health")?;
        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Dashboard Operations
    // =========================================================================

    /// Windowed summary and trends; accepts tokens or UI labels
    #[instrument(skip(self))]
    pub async fn summary(&self, time_range: &str) -> Result<SummaryResponse> {
        self.cached_get(
            "/dashboard/summary",
            &[("timeRange", normalize(time_range).to_string())],
        )
        .await
    }

    /// Five-minute realtime snapshot
    #[instrument(skip(self))]
    pub async fn realtime(&self) -> Result<RealtimeSnapshot> {
        self.cached_get("/dashboard/realtime", &[]).await
    }

    /// Hourly performance breakdown
    #[instrument(skip(self))]
    pub async fn performance(&self, time_range: &str) -> Result<PerformanceResponse> {
        self.cached_get(
            "/dashboard/performance",
            &[("timeRange", normalize(time_range).to_string())],
        )
        .await
    }

    // =========================================================================
    // Interface Operations
    // =========================================================================

    /// One page of execution logs
    #[instrument(skip(self))]
    pub async fn logs(&self, params: &LogsParams) -> Result<LogsPage> {
        self.cached_get("/interfaces/logs", &params.to_pairs()).await
    }

    /// Distinct interface names, sorted
    #[instrument(skip(self))]
    pub async fn interface_names(&self) -> Result<Vec<String>> {
        self.cached_get::<InterfaceNames>("/interfaces/names", &[])
            .await
            .map(|r| r.interface_names)
    }

    /// Distinct integration keys, sorted
    #[instrument(skip(self))]
    pub async fn integration_keys(&self) -> Result<Vec<String>> {
        self.cached_get::<IntegrationKeys>("/interfaces/keys", &[])
            .await
            .map(|r| r.integration_keys)
    }

    /// Record one execution log
    ///
    /// Cached reads are left alone and may not show the new record until
    /// they expire or the cache is cleared.
    #[instrument(skip(self, log), fields(interface = %log.interface_name))]
    pub async fn record_log(&self, log: &NewExecutionLog) -> Result<ExecutionLog> {
        let url = self.endpoint("/interfaces/logs")?;
        let response = self.client.post(url).json(log).send().await?;
        self.handle_response::<RecordedLog>(response)
            .await
            .map(|r| r.log)
    }

    // =========================================================================
    // Sample Data Operations
    // =========================================================================

    /// Replace the store contents with freshly generated records
    #[instrument(skip(self))]
    pub async fn seed(&self) -> Result<SeedResult> {
        let url = self.endpoint("/data/seed")?;
        let response = self.client.post(url).send().await?;
        self.handle_response(response).await
    }

    /// Append generated records; the server picks the count when `None`
    #[instrument(skip(self))]
    pub async fn add_more(&self, count: Option<u64>) -> Result<AddMoreResult> {
        let url = self.endpoint("/data/add-more")?;
        let body = match count {
            Some(n) => serde_json::json!({ "count": n }),
            None => serde_json::json!({}),
        };
        let response = self.client.post(url).json(&body).send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("{}{}", API_PREFIX, path))?)
    }

    /// GET through the response cache, keyed on path and parameters
    async fn cached_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let key = cache_key(path, params);
        let body = self
            .cache
            .get_or_fetch(&key, || self.fetch_bytes(path, params))
            .await
            .map_err(ConnexClientError::from)?;

        serde_json::from_slice(&body).map_err(|e| ConnexClientError::ParseError(e.to_string()))
    }

    async fn fetch_bytes(&self, path: &str, params: &[(&str, String)]) -> Result<Bytes> {
        let mut url = self.endpoint(path)?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
                query.append_pair(name, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.bytes().await?)
        } else {
            Err(self.extract_error_from_status(response, status).await)
        }
    }

    /// Handle response and parse JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ConnexClientError::ParseError(e.to_string()))
        } else {
            Err(self.extract_error_from_status(response, status).await)
        }
    }

    async fn extract_error_from_status(
        &self,
        response: reqwest::Response,
        status: StatusCode,
    ) -> ConnexClientError {
        // Try to parse error response body
        let (message, retry_after) = match response.json::<ErrorResponse>().await {
            Ok(err) => (err.message, err.retry_after),
            Err(_) => (format!("HTTP {}", status), None),
        };

        match status {
            StatusCode::TOO_MANY_REQUESTS => ConnexClientError::RateLimited {
                retry_after: retry_after.unwrap_or(0),
            },
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ConnexClientError::Timeout,
            _ => ConnexClientError::server_error(status.as_u16(), message),
        }
    }
}
