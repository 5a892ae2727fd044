//! API Module
//!
//! HTTP handlers and routing for the quote service REST API.
//!
//! # Endpoints
//! - `GET /api/stock?ticker=` - Live quote for one ticker
//! - `GET /api/portfolio` - Default holdings
//! - `GET|POST /api/portfolio/live` - Holdings valued at live prices
//! - `GET /stats` - Quote cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
