//! Runtime configuration for the API layer

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment environment; controls error detail exposure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: '{}'", s)),
        }
    }
}

/// API layer settings; every field has a default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub environment: Environment,
    /// Budget for a single store query
    pub store_timeout_ms: u64,
    pub rate_limit: RateLimitConfig,
    pub seed: SeedConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            store_timeout_ms: 5_000,
            rate_limit: RateLimitConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

/// Fixed-window per-IP request limit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per client per window
    pub max_requests: u64,
    pub window_secs: u64,
    /// How often expired client entries are pruned
    pub sweep_interval_secs: u64,
    /// Upper bound on concurrently tracked clients
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 1_000,
            window_secs: 60,
            sweep_interval_secs: 60,
            max_tracked_clients: 10_000,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs.max(1))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Sample data sizes for the data endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Records written by a full reseed
    pub record_count: usize,
    pub batch_size: usize,
    /// Upper bound accepted by add-more
    pub max_add_count: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            record_count: connex_store::seed::DEFAULT_SEED_COUNT,
            batch_size: connex_store::seed::DEFAULT_BATCH_SIZE,
            max_add_count: 100_000,
        }
    }
}
