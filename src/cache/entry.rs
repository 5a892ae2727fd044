//! Cache Entry Module
//!
//! Defines the structure for individual fresh cache entries.

// == Cache Entry ==
/// A value held in the fresh map together with its expiry instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The stored value
    pub data: T,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl_ms` after `now_ms`.
    pub fn new(data: T, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            data,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration time, so a lapsed TTL is
    /// never served even for a single millisecond.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}
