//! Application state for the ConnexView API

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use connex_core::{LogStore, StoreError, StoreResult};
use tokio::sync::Mutex;

use crate::config::ApiConfig;
use crate::rate_limit::RateLimiter;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn LogStore>,
    pub config: Arc<ApiConfig>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Serializes reseed and add-more so they never interleave
    pub(crate) seed_lock: Arc<Mutex<()>>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn LogStore>, config: ApiConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        Self {
            store,
            config: Arc::new(config),
            rate_limiter,
            seed_lock: Arc::new(Mutex::new(())),
            started_at: Instant::now(),
        }
    }

    /// State with default configuration
    pub fn with_store(store: Arc<dyn LogStore>) -> Self {
        Self::new(store, ApiConfig::default())
    }

    pub fn store(&self) -> &dyn LogStore {
        self.store.as_ref()
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Run a store query under the configured time budget
    pub async fn timed<T, F>(&self, query: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let budget = self.config.store_timeout();
        tokio::time::timeout(budget, query)
            .await
            .unwrap_or(Err(StoreError::Timeout(budget)))
    }
}
