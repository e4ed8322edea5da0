//! Caching module for websearch-rs
//!
//! An in-memory, expiring store for provider result sets keyed by request
//! fingerprint. Expired entries are reclaimed lazily when looked up, or
//! eagerly by [`CacheStore::clear_expired`]; there is no background sweeper.

mod clock;
mod key;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{derive_key, NO_PROVIDER};

use crate::results::{mark_provenance, ResultItem};
use crate::search::SearchParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Default time-to-live for cached results in seconds
pub const DEFAULT_TTL: u64 = 3600;

/// A stored result set and its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
    expires_at: DateTime<Utc>,
    payload: Vec<ResultItem>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Snapshot of cache access statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    /// Entries currently stored, expired or not
    pub item_count: usize,
    /// `hits / (hits + misses)`, 0 before the first lookup
    pub hit_rate: f64,
}

impl CacheStats {
    /// Hit rate formatted as a percentage with two decimals
    pub fn hit_rate_percent(&self) -> String {
        format!("{:.2}%", self.hit_rate * 100.0)
    }
}

/// Cache for provider search results
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: u64,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStore {
    /// Create a new store with the given default TTL in seconds
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Create a new store reading time from `clock`
    pub fn with_clock(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    /// TTL applied when `set` is called without one
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Look up a cached result set.
    ///
    /// Returned items are copies with `is_from_cache` set. An expired entry
    /// is removed and reported as a miss.
    pub fn get(
        &self,
        query: &str,
        provider: Option<&str>,
        params: &SearchParams,
    ) -> Option<Vec<ResultItem>> {
        let key = derive_key(query, provider, params);
        let now = self.clock.now();

        {
            let entries = self.read();
            match entries.get(&key) {
                Some(entry) if !entry.is_expired(now) => return Some(self.hit(entry)),
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Expired under the read lock; re-check before removing since a
        // concurrent `set` may have replaced the entry in between.
        let mut entries = self.write();
        match entries.get(&key) {
            Some(entry) if !entry.is_expired(now) => return Some(self.hit(entry)),
            Some(_) => {
                entries.remove(&key);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                debug!("Expired cache entry {} removed on lookup", key);
            }
            None => {}
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a result set, replacing any existing entry for the same key
    pub fn set(
        &self,
        query: &str,
        payload: Vec<ResultItem>,
        ttl_seconds: Option<u64>,
        provider: Option<&str>,
        params: &SearchParams,
    ) {
        let key = derive_key(query, provider, params);
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let expires_at = expiry(self.clock.now(), ttl);

        self.write().insert(
            key,
            CacheEntry {
                expires_at,
                payload,
            },
        );
    }

    /// Remove all entries. Statistics are kept.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Remove every expired entry and return how many were removed
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        self.expirations
            .fetch_add(removed as u64, Ordering::Relaxed);
        debug!("Cleared {} expired cache entries", removed);
        removed
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Get a statistics snapshot
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };

        CacheStats {
            hits,
            misses,
            expirations: self.expirations.load(Ordering::Relaxed),
            item_count: self.len(),
            hit_rate,
        }
    }

    fn hit(&self, entry: &CacheEntry) -> Vec<ResultItem> {
        self.hits.fetch_add(1, Ordering::Relaxed);
        let mut items = entry.payload.clone();
        mark_provenance(&mut items, true);
        items
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// `now + ttl`, saturating at the latest representable instant
fn expiry(now: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    chrono::Duration::from_std(std::time::Duration::from_secs(ttl_seconds))
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn items(source: &str, n: u32) -> Vec<ResultItem> {
        (1..=n)
            .map(|i| {
                ResultItem::new(
                    format!("{} result {}", source, i),
                    format!("https://example.com/{}/{}", source, i),
                    "snippet",
                    source,
                    i,
                )
            })
            .collect()
    }

    fn manual_store(ttl: u64) -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (CacheStore::with_clock(ttl, clock.clone()), clock)
    }

    #[test]
    fn test_set_then_get_marks_cached() {
        let cache = CacheStore::new(60);
        let params = SearchParams::new().with("num", 2);
        let mut payload = items("google", 2);
        payload[0].is_from_cache = true;

        cache.set("cats", payload.clone(), None, Some("google"), &params);
        let cached = cache.get("cats", Some("google"), &params).unwrap();

        assert_eq!(cached.len(), 2);
        assert!(cached.iter().all(|i| i.is_from_cache));
        assert_eq!(cached[0].title, payload[0].title);
        assert_eq!(cached[1].position, 2);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_get_returns_copy() {
        let cache = CacheStore::new(60);
        let params = SearchParams::new();
        cache.set("cats", items("google", 1), None, Some("google"), &params);

        let mut first = cache.get("cats", Some("google"), &params).unwrap();
        first[0].title = "changed".to_string();

        let second = cache.get("cats", Some("google"), &params).unwrap();
        assert_eq!(second[0].title, "google result 1");
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache = CacheStore::new(60);
        assert!(cache.get("cats", None, &SearchParams::new()).is_none());

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.expirations, 0);
    }

    #[test]
    fn test_params_scope_entries() {
        let cache = CacheStore::new(60);
        let page_one = SearchParams::new().with("num", 10).with("start", 1);
        let page_two = SearchParams::new().with("num", 10).with("start", 11);

        cache.set("cats", items("google", 3), None, Some("google"), &page_one);

        assert!(cache.get("cats", Some("google"), &page_two).is_none());
        assert!(cache.get("cats", Some("brave"), &page_one).is_none());
        assert!(cache.get("cats", Some("google"), &page_one).is_some());
    }

    #[test]
    fn test_zero_ttl_expires_on_get() {
        let (cache, clock) = manual_store(60);
        let params = SearchParams::new();

        cache.set("cats", items("google", 2), Some(0), Some("google"), &params);
        clock.advance(Duration::milliseconds(1));

        assert!(cache.get("cats", Some("google"), &params).is_none());
        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.item_count, 0);

        // Already removed by the lookup
        assert_eq!(cache.clear_expired(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_entry_expires_exactly_at_ttl() {
        let (cache, clock) = manual_store(30);
        let params = SearchParams::new();
        cache.set("cats", items("google", 1), None, None, &params);

        clock.advance(Duration::seconds(29));
        assert!(cache.get("cats", None, &params).is_some());

        clock.advance(Duration::seconds(1));
        assert!(cache.get("cats", None, &params).is_none());
    }

    #[test]
    fn test_clear_expired_removes_only_expired() {
        let (cache, clock) = manual_store(3600);
        let params = SearchParams::new();

        cache.set("short-1", items("a", 1), Some(10), None, &params);
        cache.set("short-2", items("a", 1), Some(20), None, &params);
        cache.set("long", items("a", 1), Some(100), None, &params);

        clock.advance(Duration::seconds(20));
        assert_eq!(cache.clear_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expirations, 2);
        assert!(cache.get("long", None, &params).is_some());

        assert_eq!(cache.clear_expired(), 0);
    }

    #[test]
    fn test_set_overwrites_and_refreshes_ttl() {
        let (cache, clock) = manual_store(10);
        let params = SearchParams::new();

        cache.set("cats", items("a", 1), None, None, &params);
        clock.advance(Duration::seconds(8));
        cache.set("cats", items("b", 3), None, None, &params);
        clock.advance(Duration::seconds(8));

        let cached = cache.get("cats", None, &params).unwrap();
        assert_eq!(cached.len(), 3);
        assert_eq!(cached[0].source, "b");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_keeps_stats() {
        let cache = CacheStore::new(60);
        let params = SearchParams::new();
        cache.set("cats", items("a", 1), None, None, &params);
        cache.get("cats", None, &params);
        cache.get("dogs", None, &params);

        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.item_count, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_hit_rate() {
        let cache = CacheStore::new(60);
        let params = SearchParams::new();
        assert_eq!(cache.stats().hit_rate, 0.0);
        assert_eq!(cache.stats().hit_rate_percent(), "0.00%");

        cache.set("cats", items("a", 1), None, None, &params);
        cache.get("cats", None, &params);
        cache.get("cats", None, &params);
        cache.get("dogs", None, &params);

        let stats = cache.stats();
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 0.005);
        assert_eq!(stats.hit_rate_percent(), "66.67%");
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let cache = CacheStore::new(60);
        let params = SearchParams::new();
        cache.set("cats", items("a", 1), Some(u64::MAX), None, &params);
        assert!(cache.get("cats", None, &params).is_some());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(CacheStore::new(60));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    let params = SearchParams::new().with("thread", t);
                    for i in 0..100 {
                        let query = format!("q{}", i % 10);
                        cache.set(&query, items("a", 2), None, None, &params);
                        let got = cache.get(&query, None, &params);
                        assert_eq!(got.map(|v| v.len()), Some(2));
                        cache.clear_expired();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.hits, 800);
        assert_eq!(stats.item_count, 80);
    }
}
