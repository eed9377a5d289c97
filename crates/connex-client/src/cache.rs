//! TTL response cache
//!
//! Entries are reused while younger than the TTL and are never invalidated
//! by writes; only [`ResponseCache::clear`] or expiry removes them. When
//! several tasks miss the same key at once, one fetches and the rest wait
//! for its result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;
use url::form_urlencoded;

/// Default freshness window
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Upper bound on cached responses
const MAX_ENTRIES: u64 = 10_000;

/// Cache key for a path plus query parameters.
///
/// Parameters are ordered by name, empty values are dropped and the rest
/// are form-encoded, so requests that differ only in parameter order or
/// blank filters share an entry and no two distinct requests collide.
pub fn cache_key(path: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<(&str, &str)> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (*k, v.as_str()))
        .collect();
    sorted.sort();

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(sorted)
        .finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Cache<String, Bytes>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { ttl, entries }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`
    pub async fn lookup(&self, key: &str) -> Option<Bytes> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: impl Into<String>, value: Bytes) {
        self.entries.insert(key.into(), value).await;
    }

    /// Return the cached value or run `fetch` and cache its success.
    ///
    /// Failures are not cached. Tasks that waited on a failed fetch share
    /// its error.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Bytes, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
        E: Send + Sync + 'static,
    {
        self.entries.try_get_with(key.to_string(), fetch()).await
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of live entries, after pending evictions are applied
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
