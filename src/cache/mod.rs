//! Cache Module
//!
//! Provides an in-memory TTL cache with lazy expiry and stale fallback.

mod clock;
mod entry;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TtlCache;

// == Public Constants ==
/// Freshness window used when none is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(15);
