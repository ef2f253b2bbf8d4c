//! In-memory TTL key-value cache with hit/miss accounting.
//!
//! Expired entries are removed lazily when read (and by [`TtlCache::purge_expired`],
//! which the API's background sweeper calls periodically). There is no LRU
//! and no size bound; the cache is process-local.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently stored, including expired ones not yet purged.
    pub entries: usize,
    /// `hits / (hits + misses)`, or `0.0` before the first lookup.
    pub hit_rate: f64,
}

/// Thread-safe TTL cache keyed by string.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return a clone of the cached value if present and not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// Store `value` with the cache's default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Remove a key. Returns `true` if an entry (expired or not) was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Drop all expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            entries: self.lock().len(),
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }

    /// Return the cached value for `key`, or compute it with `f` and cache
    /// the result for `ttl`. Errors from `f` are returned and not cached.
    ///
    /// Concurrent misses for the same key may both run `f`; the last write
    /// wins.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        f: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = f().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        let value = match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        };
        drop(entries);

        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    fn set_at(&self, key: impl Into<String>, value: V, ttl: Duration, now: Instant) {
        self.lock().insert(
            key.into(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn get_counts_hits_and_misses() {
        let cache = TtlCache::new(MINUTE);
        assert_eq!(cache.get("a"), None);
        cache.set_default("a", 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("a"), Some(1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn expired_entry_is_removed_on_read() {
        let cache = TtlCache::new(MINUTE);
        let start = Instant::now();
        cache.set_at("k", "v", Duration::from_secs(10), start);

        assert_eq!(cache.get_at("k", start + Duration::from_secs(9)), Some("v"));
        assert_eq!(cache.get_at("k", start + Duration::from_secs(10)), None);
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = TtlCache::new(MINUTE);
        let start = Instant::now();
        cache.set_at("short", 1, Duration::from_secs(1), start);
        cache.set_at("long", 2, Duration::from_secs(100), start);

        assert_eq!(cache.purge_expired_at(start + Duration::from_secs(5)), 1);
        assert_eq!(cache.get_at("long", start + Duration::from_secs(5)), Some(2));
    }

    #[test]
    fn delete_and_clear() {
        let cache = TtlCache::new(MINUTE);
        cache.set_default("a", 1);
        cache.set_default("b", 2);
        cache.set_default("c", 3);

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn overwrite_resets_expiry() {
        let cache = TtlCache::new(MINUTE);
        let start = Instant::now();
        cache.set_at("k", 1, Duration::from_secs(1), start);
        cache.set_at("k", 2, Duration::from_secs(10), start + Duration::from_secs(2));
        assert_eq!(cache.get_at("k", start + Duration::from_secs(5)), Some(2));
    }

    #[tokio::test]
    async fn get_or_try_insert_memoizes_success_only() {
        let cache: TtlCache<String> = TtlCache::new(MINUTE);

        let failed: Result<String, &str> = cache
            .get_or_try_insert_with("k", MINUTE, || async { Err("boom") })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.stats().entries, 0);

        let first: Result<String, &str> = cache
            .get_or_try_insert_with("k", MINUTE, || async { Ok("fresh".to_string()) })
            .await;
        assert_eq!(first.unwrap(), "fresh");

        let second: Result<String, &str> = cache
            .get_or_try_insert_with("k", MINUTE, || async { Ok("other".to_string()) })
            .await;
        assert_eq!(second.unwrap(), "fresh");
    }
}
