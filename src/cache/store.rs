//! Cache Store Module
//!
//! TTL cache with lazy expiry and a last-known-value stale map.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, DEFAULT_TTL};

// == TTL Cache ==
/// Key-value store with a fixed freshness window per instance.
///
/// Two maps are kept:
/// - `fresh` holds entries still inside their TTL (subset of keys ever set)
/// - `stale` holds the latest value ever stored for every key, never expired
///
/// Expiry is evaluated on read; there is no background sweep. Neither map
/// is ever pruned, so the stale map grows with the number of distinct keys.
pub struct TtlCache<T> {
    /// Entries within TTL
    fresh: HashMap<String, CacheEntry<T>>,
    /// Last value stored per key
    stale: HashMap<String, T>,
    /// Freshness window in milliseconds
    ttl_ms: u64,
    /// Time source for expiry decisions
    clock: Arc<dyn Clock>,
    /// Performance statistics
    stats: CacheStats,
}

impl<T: Clone> TtlCache<T> {
    // == Constructor ==
    /// Creates a cache reading the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            fresh: HashMap::new(),
            stale: HashMap::new(),
            ttl_ms: ttl.as_millis() as u64,
            clock,
            stats: CacheStats::new(),
        }
    }

    // == Get ==
    /// Returns the fresh value for `key`.
    ///
    /// An entry whose TTL has lapsed is demoted: its value is copied into the
    /// stale map, it is removed from the fresh map, and `None` is returned.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();

        let Some(entry) = self.fresh.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            if let Some(expired) = self.fresh.remove(key) {
                self.stale.insert(key.to_string(), expired.data);
            }
            self.stats.record_expiration();
            self.stats.record_miss();
            debug!(key, "Cache entry expired, demoted to stale");
            return None;
        }

        self.stats.record_hit();
        Some(entry.data.clone())
    }

    // == Get Stale ==
    /// Returns the most recently stored value for `key`, regardless of age.
    pub fn get_stale(&self, key: &str) -> Option<T> {
        self.stale.get(key).cloned()
    }

    // == Set ==
    /// Stores `value` as fresh for one TTL and overwrites the stale copy.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        let entry = CacheEntry::new(value.clone(), self.clock.now_ms(), self.ttl_ms);
        self.fresh.insert(key.clone(), entry);
        self.stale.insert(key, value);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.fresh_entries = self.fresh.len();
        stats.stale_entries = self.stale.len();
        stats
    }

    /// Freshness window of this instance.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Number of entries currently held in the fresh map.
    pub fn len(&self) -> usize {
        self.fresh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fresh.is_empty()
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<T> fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("fresh", &self.fresh.len())
            .field("stale", &self.stale.len())
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}
