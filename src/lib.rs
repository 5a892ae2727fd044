//! EquityLens - live quote aggregation service
//!
//! Merges a price provider and a valuation provider into per-ticker quotes,
//! with TTL caching, retry with backoff, and stale-data fallback.

pub mod api;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod portfolio;
pub mod retry;
pub mod sources;

pub use api::AppState;
pub use batch::batch_fetch;
pub use config::Config;
pub use fetcher::TickerFetcher;
