//! Time-bounded result caching for fetched market data.
//!
//! The contract is deliberately small: a [`ResultCache`] stores raw string
//! payloads under a key with an expiry, and [`get_or_compute`] layers the
//! memoize-on-success policy on top. Store-level failures degrade to cache
//! misses so a flaky cache never takes a request down with it.

mod memory;
mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Key-value store with per-entry expiry.
#[async_trait]
pub trait ResultCache {
    /// Returns the unexpired payload stored under `key`, if any.
    async fn fetch(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, expiring after `ttl`. Best effort.
    async fn store(&self, key: &str, value: &str, ttl: Duration);
}

/// Returns the cached value for `key`, or computes, stores, and returns a
/// fresh one.
///
/// `compute` runs only on a miss. Its error propagates untouched and leaves
/// the cache unwritten, so a failed fetch is never memoized. A cached
/// payload that no longer deserializes is discarded and treated as a miss.
pub async fn get_or_compute<C, T, E, F, Fut>(
    cache: &C,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T, E>
where
    C: ResultCache + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(raw) = cache.fetch(key).await {
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("get_or_compute | cache hit | key: {}", key);
                return Ok(value);
            }
            Err(e) => {
                warn!(
                    "get_or_compute | discarding unreadable entry | key: {} | {}",
                    key, e
                );
            }
        }
    }

    debug!("get_or_compute | cache miss | key: {}", key);
    let value = compute().await?;

    match serde_json::to_string(&value) {
        Ok(raw) => cache.store(key, &raw, ttl).await,
        Err(e) => warn!(
            "get_or_compute | value not serializable | key: {} | {}",
            key, e
        ),
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    async fn counted(counter: &AtomicUsize, value: Result<u32, String>) -> Result<u32, String> {
        counter.fetch_add(1, Ordering::SeqCst);
        value
    }

    #[tokio::test]
    async fn compute_runs_once_within_ttl() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        let first = get_or_compute(&cache, "k", TTL, || counted(&calls, Ok(7))).await;
        let second = get_or_compute(&cache, "k", TTL, || counted(&calls, Ok(8))).await;

        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_recomputes() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        let first = get_or_compute(&cache, "k", Duration::ZERO, || counted(&calls, Ok(1))).await;
        let second = get_or_compute(&cache, "k", Duration::ZERO, || counted(&calls, Ok(2))).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_compute_is_not_cached() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        let first =
            get_or_compute(&cache, "k", TTL, || counted(&calls, Err("boom".to_string()))).await;
        assert_eq!(first, Err("boom".to_string()));

        let second = get_or_compute(&cache, "k", TTL, || counted(&calls, Ok(3))).await;
        assert_eq!(second, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreadable_entry_is_recomputed() {
        let cache = MemoryCache::new();
        cache.store("k", "not json {", TTL).await;
        let calls = AtomicUsize::new(0);

        let value = get_or_compute(&cache, "k", TTL, || counted(&calls, Ok(9))).await;

        assert_eq!(value, Ok(9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        let a = get_or_compute(&cache, "a", TTL, || counted(&calls, Ok(1))).await;
        let b = get_or_compute(&cache, "b", TTL, || counted(&calls, Ok(2))).await;

        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
