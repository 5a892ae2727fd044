//! Data models for the quote service
//!
//! This module defines the quote types produced by the fetch pipeline and
//! the DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod quote;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use quote::{BatchResult, Quote, TickerResult, Valuation};
pub use requests::{validate_holdings, LivePortfolioRequest, StockQuery};
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
