//! Caching layer for real-time provider responses.
//!
//! Responses are cached under the fully rendered request body, scoped by the
//! id of the real-time system that produced them. The body is deterministic
//! for a given (stop, count, from time) query, so identical logical queries
//! hit the same entry, and several clients configured with the same system
//! id share entries when they share the cache handle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

/// Cache key: (real-time system id, rendered request body).
type ResponseKey = (String, String);

/// Raw transport response as received from a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the provider answered with 200 OK.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 10_000,
        }
    }
}

/// Shared cache for real-time responses.
///
/// Cloning is cheap and yields a handle onto the same entries.
#[derive(Clone)]
pub struct ResponseCache {
    responses: MokaCache<ResponseKey, Arc<CachedResponse>>,
}

impl ResponseCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let responses = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { responses }
    }

    /// Get the response cached for `request`, or produce it with `fetch`.
    ///
    /// Concurrent callers asking for the same entry share a single `fetch`;
    /// the others wait for its outcome. A failed fetch is not cached, and
    /// every waiter receives the same error.
    pub async fn get_or_fetch<F, E>(
        &self,
        source_id: &str,
        request: &str,
        fetch: F,
    ) -> Result<Arc<CachedResponse>, Arc<E>>
    where
        F: Future<Output = Result<Arc<CachedResponse>, E>>,
        E: Send + Sync + 'static,
    {
        self.responses
            .try_get_with((source_id.to_string(), request.to_string()), fetch)
            .await
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.responses.entry_count())
            .finish()
    }
}
