//! API Routes
//!
//! Configures the Axum router with all quote service endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    custom_portfolio_handler, health_handler, holdings_handler, live_portfolio_handler,
    stats_handler, stock_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/stock?ticker=` - Live quote for one ticker
/// - `GET /api/portfolio` - Default holdings
/// - `GET /api/portfolio/live` - Default holdings valued at live prices
/// - `POST /api/portfolio/live` - Caller holdings valued at live prices
/// - `GET /stats` - Quote cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/stock", get(stock_handler))
        .route("/api/portfolio", get(holdings_handler))
        .route(
            "/api/portfolio/live",
            get(live_portfolio_handler).post(custom_portfolio_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
