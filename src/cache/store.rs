//! # Bounded Response Cache
//!
//! In-process key/value store budgeted in bytes, with per-entry TTL and
//! strict least-recently-used eviction.
//!
//! ## Invariants
//!
//! - The summed `size_bytes` of live entries never exceeds `max_size_bytes`.
//! - An entry past its `expires_at` is never returned by `get` or `has`.
//!
//! Expiry is lazy: expired entries are dropped when touched, when `set`
//! needs room, or on an explicit [`ResponseCache::purge_expired`]. There is
//! no background sweeper.
//!
//! All operations serialize on one `parking_lot::Mutex` guarding the LRU map
//! and the byte tally; hit/miss/eviction counters are lock-free atomics.
//! Timestamps come from tokio's clock so paused-time tests can drive expiry.

use super::size::MeasuredSize;
use crate::config::CacheConfig;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Point-in-time cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub size_bytes: usize,
    pub max_size_bytes: usize,
    pub default_ttl_seconds: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

#[derive(Debug, Default)]
struct AtomicCacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl AtomicCacheMetrics {
    #[inline]
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    size_bytes: usize,
    inserted_at: Instant,
    /// `None` when `inserted_at + ttl` overflows the clock
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

struct StoreState<V> {
    entries: LruCache<String, CacheEntry<V>>,
    total_size_bytes: usize,
}

impl<V> StoreState<V> {
    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.pop(key)?;
        self.total_size_bytes -= entry.size_bytes;
        Some(entry)
    }

    fn pop_lru(&mut self) -> Option<(String, CacheEntry<V>)> {
        let (key, entry) = self.entries.pop_lru()?;
        self.total_size_bytes -= entry.size_bytes;
        Some((key, entry))
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }
}

/// Byte-budgeted, TTL-expiring LRU cache
pub struct ResponseCache<V> {
    state: Mutex<StoreState<V>>,
    max_size_bytes: usize,
    default_ttl: Duration,
    metrics: AtomicCacheMetrics,
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResponseCache")
            .field("entries", &state.entries.len())
            .field("size_bytes", &state.total_size_bytes)
            .field("max_size_bytes", &self.max_size_bytes)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl<V> ResponseCache<V>
where
    V: MeasuredSize + Clone,
{
    /// Create an empty store holding at most `max_size_bytes` of values
    pub fn new(max_size_bytes: usize, default_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(StoreState {
                entries: LruCache::unbounded(),
                total_size_bytes: 0,
            }),
            max_size_bytes,
            default_ttl,
            metrics: AtomicCacheMetrics::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size_bytes, config.ttl)
    }

    /// Return a live entry and mark it most recently used
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut state = self.state.lock();

        match state.entries.get(key) {
            None => {
                self.metrics.record_miss();
                return None;
            }
            Some(entry) if !entry.is_expired(now) => {
                self.metrics.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        state.remove(key);
        self.metrics.record_expirations(1);
        self.metrics.record_miss();
        None
    }

    /// Insert or replace `key`, evicting least recently used entries to fit
    ///
    /// Uses `ttl` when given, otherwise the store default. A value larger
    /// than the whole budget is not stored.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let size_bytes = value.size_bytes();

        if size_bytes > self.max_size_bytes {
            warn!(
                key_prefix = key_prefix(&key),
                size_bytes,
                max_size_bytes = self.max_size_bytes,
                "Cache entry exceeds total budget, not storing"
            );
            return;
        }

        let now = Instant::now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut state = self.state.lock();

        state.remove(&key);

        if state.total_size_bytes + size_bytes > self.max_size_bytes {
            let expired = state.purge_expired(now);
            self.metrics.record_expirations(expired);
        }

        let mut evicted = 0;
        while state.total_size_bytes + size_bytes > self.max_size_bytes {
            let Some((evicted_key, entry)) = state.pop_lru() else {
                break;
            };
            evicted += 1;
            debug!(
                key_prefix = key_prefix(&evicted_key),
                size_bytes = entry.size_bytes,
                age_ms = now.saturating_duration_since(entry.inserted_at).as_millis() as u64,
                "Evicted least recently used cache entry"
            );
        }
        self.metrics.record_evictions(evicted);

        state.total_size_bytes += size_bytes;
        state.entries.push(
            key,
            CacheEntry {
                value,
                size_bytes,
                inserted_at: now,
                expires_at: now.checked_add(ttl),
            },
        );
    }

    /// Whether a live entry exists; does not affect recency
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();

        let expired = match state.entries.peek(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            state.remove(key);
            self.metrics.record_expirations(1);
        }
        !expired
    }

    /// Remove `key`, returning whether an entry (live or expired) was present
    pub fn delete(&self, key: &str) -> bool {
        self.state.lock().remove(key).is_some()
    }

    /// Drop every entry; hit and miss counters are kept
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.total_size_bytes = 0;
    }

    /// Drop every expired entry now, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let removed = self.state.lock().purge_expired(now);
        self.metrics.record_expirations(removed);
        removed
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently accounted against the budget
    pub fn size_bytes(&self) -> usize {
        self.state.lock().total_size_bytes
    }

    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Snapshot of occupancy and hit/miss counters
    pub fn stats(&self) -> CacheStats {
        let (entries, size_bytes) = {
            let state = self.state.lock();
            (state.entries.len(), state.total_size_bytes)
        };

        CacheStats {
            entries,
            size_bytes,
            max_size_bytes: self.max_size_bytes,
            default_ttl_seconds: self.default_ttl.as_secs(),
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            evictions: self.metrics.evictions.load(Ordering::Relaxed),
            expirations: self.metrics.expirations.load(Ordering::Relaxed),
        }
    }
}

/// Leading characters of a key, enough to correlate log lines
pub(crate) fn key_prefix(key: &str) -> &str {
    let end = key
        .char_indices()
        .nth(24)
        .map_or(key.len(), |(index, _)| index);
    &key[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::size::SizedValue;
    use std::sync::Arc;

    type TestCache = ResponseCache<SizedValue<&'static str>>;

    fn sized(bytes: usize) -> SizedValue<&'static str> {
        SizedValue::new(bytes, "payload")
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache: ResponseCache<String> = ResponseCache::new(1024, Duration::from_secs(60));
        cache.set("k", "cached response".to_string(), None);

        assert_eq!(cache.get("k").as_deref(), Some("cached response"));
        assert!(cache.has("k"));
        assert_eq!(cache.size_bytes(), 15);
        assert_eq!(cache.get("absent"), None);
    }

    #[tokio::test]
    async fn test_replace_recharges_size() {
        let cache = TestCache::new(100, Duration::from_secs(60));
        cache.set("k", sized(40), None);
        cache.set("k", sized(10), None);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size_bytes(), 10);
    }

    #[tokio::test]
    async fn test_evicts_least_recently_used_first() {
        let cache = TestCache::new(30, Duration::from_secs(60));
        cache.set("a", sized(10), None);
        cache.set("b", sized(10), None);
        cache.set("c", sized(10), None);

        // Touch "a" so "b" becomes the oldest
        assert!(cache.get("a").is_some());

        cache.set("d", sized(10), None);

        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert!(cache.has("c"));
        assert!(cache.has("d"));
        assert_eq!(cache.size_bytes(), 30);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_has_does_not_promote() {
        let cache = TestCache::new(20, Duration::from_secs(60));
        cache.set("a", sized(10), None);
        cache.set("b", sized(10), None);

        assert!(cache.has("a"));
        cache.set("c", sized(10), None);

        assert!(!cache.has("a"));
        assert!(cache.has("b"));
    }

    #[tokio::test]
    async fn test_large_entry_evicts_several() {
        let cache = TestCache::new(100, Duration::from_secs(60));
        for key in ["a", "b", "c", "d"] {
            cache.set(key, sized(25), None);
        }
        cache.set("big", sized(60), None);

        assert!(!cache.has("a"));
        assert!(!cache.has("b"));
        assert!(!cache.has("c"));
        assert!(cache.has("d"));
        assert!(cache.has("big"));
        assert_eq!(cache.size_bytes(), 85);
    }

    #[tokio::test]
    async fn test_oversized_entry_is_rejected_and_keeps_existing() {
        let cache = TestCache::new(50, Duration::from_secs(60));
        cache.set("small", sized(10), None);
        cache.set("huge", sized(51), None);

        assert!(!cache.has("huge"));
        assert!(cache.has("small"));
        assert_eq!(cache.size_bytes(), 10);
    }

    #[tokio::test]
    async fn test_entry_exactly_at_budget_fits() {
        let cache = TestCache::new(50, Duration::from_secs(60));
        cache.set("a", sized(20), None);
        cache.set("full", sized(50), None);

        assert!(cache.has("full"));
        assert!(!cache.has("a"));
        assert_eq!(cache.size_bytes(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = TestCache::new(100, Duration::from_secs(60));
        cache.set("short", sized(10), Some(Duration::from_secs(5)));
        cache.set("default", sized(10), None);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(cache.get("short").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("short").is_none());
        assert!(!cache.has("short"));
        assert!(cache.has("default"));
        assert_eq!(cache.size_bytes(), 10);

        tokio::time::advance(Duration::from_secs(56)).await;
        assert!(!cache.has("default"));
        assert_eq!(cache.stats().expirations, 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_dropped_before_lru_eviction() {
        let cache = TestCache::new(30, Duration::from_secs(60));
        cache.set("old-but-live", sized(10), None);
        cache.set("expiring", sized(10), Some(Duration::from_secs(1)));
        cache.set("recent", sized(10), None);

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.set("new", sized(10), None);

        assert!(cache.has("old-but-live"));
        assert!(cache.has("recent"));
        assert!(cache.has("new"));
        let stats = cache.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = TestCache::new(100, Duration::from_secs(10));
        cache.set("a", sized(10), None);
        cache.set("b", sized(10), Some(Duration::from_secs(30)));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size_bytes(), 10);
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let cache = TestCache::new(100, Duration::from_secs(10));
        cache.set("forever", sized(10), Some(Duration::MAX));
        assert!(cache.has("forever"));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = TestCache::new(100, Duration::from_secs(60));
        cache.set("a", sized(10), None);
        cache.set("b", sized(10), None);

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.size_bytes(), 10);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
        assert!(!cache.has("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_len_counts_unpurged_expired_entries() {
        let cache = TestCache::new(100, Duration::from_secs(5));
        cache.set("a", sized(10), None);
        cache.set("b", sized(10), None);
        cache.get("a");

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.size_bytes(), 20);

        assert!(cache.delete("b"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let cache = TestCache::new(100, Duration::from_secs(90));
        cache.set("a", sized(10), None);
        cache.get("a");
        cache.get("a");
        cache.get("b");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.size_bytes, 10);
        assert_eq!(stats.max_size_bytes, 100);
        assert_eq!(stats.default_ttl_seconds, 90);
    }

    #[test]
    fn test_concurrent_access_respects_budget() {
        let cache = Arc::new(TestCache::new(1_000, Duration::from_secs(60)));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("w{worker}-{}", i % 50);
                        cache.set(key.clone(), sized(7 + (i % 13)), None);
                        cache.get(&key);
                        assert!(cache.size_bytes() <= 1_000);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert!(stats.size_bytes <= 1_000);
        assert!(stats.entries > 0);
    }

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("short"), "short");
        let long = "assessor:0123456789abcdef0123456789abcdef";
        assert_eq!(key_prefix(long), "assessor:0123456789abcde");
    }
}
