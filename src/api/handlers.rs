//! API Handlers
//!
//! HTTP request handlers for each quote service endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::batch::{batch_fetch, fetch_isolated};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetcher::{SharedCache, TickerFetcher};
use crate::models::{
    validate_holdings, HealthResponse, LivePortfolioRequest, StatsResponse, StockQuery,
    TickerResult,
};
use crate::portfolio::{build_snapshot, tickers, Holding, PortfolioSnapshot};
use crate::sources::{PriceClient, PriceSource, ValuationClient, ValuationSource};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Quote pipeline; owns the shared cache
    pub fetcher: Arc<TickerFetcher>,
    /// Holdings served by the parameterless portfolio endpoints
    pub holdings: Arc<Vec<Holding>>,
}

impl AppState {
    /// Creates a new AppState around an existing fetcher.
    pub fn new(fetcher: TickerFetcher, holdings: Vec<Holding>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            holdings: Arc::new(holdings),
        }
    }

    /// Wires a fetcher with the given sources and a fresh cache from `config`.
    pub fn with_sources(
        config: &Config,
        price: Arc<dyn PriceSource>,
        valuation: Arc<dyn ValuationSource>,
        holdings: Vec<Holding>,
    ) -> Self {
        let cache: SharedCache = Arc::new(RwLock::new(TtlCache::new(config.cache_ttl())));
        let fetcher = TickerFetcher::new(cache, price, valuation, config.retry_policy());
        Self::new(fetcher, holdings)
    }

    /// Creates a new AppState with live provider clients from configuration.
    pub fn from_config(config: &Config, holdings: Vec<Holding>) -> anyhow::Result<Self> {
        let price = PriceClient::new(&config.price_base_url, config.request_timeout())?;
        let valuation = ValuationClient::new(&config.valuation_base_url, config.request_timeout())?;
        Ok(Self::with_sources(
            config,
            Arc::new(price),
            Arc::new(valuation),
            holdings,
        ))
    }

    async fn snapshot(&self, holdings: &[Holding]) -> PortfolioSnapshot {
        let quotes = batch_fetch(&self.fetcher, &tickers(holdings)).await;
        let snapshot = build_snapshot(holdings, &quotes);
        if snapshot.partial_failure {
            warn!(
                holdings = holdings.len(),
                "Some holdings are missing a live price"
            );
        }
        snapshot
    }
}

/// Handler for GET /api/stock?ticker=
///
/// Returns the live quote for one ticker. Fetch problems, including a
/// panicking pipeline, degrade the data but never the status; only a
/// missing ticker is rejected.
pub async fn stock_handler(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<TickerResult>> {
    let ticker = query.ticker().map_err(AppError::InvalidRequest)?;
    Ok(Json(fetch_isolated(&state.fetcher, ticker).await))
}

/// Handler for GET /api/portfolio
///
/// Returns the default holdings without live data.
pub async fn holdings_handler(State(state): State<AppState>) -> Json<Vec<Holding>> {
    Json(state.holdings.as_ref().clone())
}

/// Handler for GET /api/portfolio/live
///
/// Values the default holdings at live prices.
pub async fn live_portfolio_handler(State(state): State<AppState>) -> Json<PortfolioSnapshot> {
    let holdings = Arc::clone(&state.holdings);
    Json(state.snapshot(&holdings).await)
}

/// Handler for POST /api/portfolio/live
///
/// Values caller-supplied holdings at live prices.
pub async fn custom_portfolio_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<LivePortfolioRequest>, JsonRejection>,
) -> Result<Json<PortfolioSnapshot>> {
    let Json(req) = body.map_err(|rejection| {
        info!(error = %rejection, "Rejected portfolio body");
        AppError::InvalidRequest("invalid request body".to_string())
    })?;

    let holdings = req.into_holdings();
    if let Some(error_msg) = validate_holdings(&holdings) {
        return Err(AppError::InvalidRequest(error_msg));
    }

    Ok(Json(state.snapshot(&holdings).await))
}

/// Handler for GET /stats
///
/// Returns quote cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.fetcher.cache().read().await;
    Json(StatsResponse::new(
        &cache.stats(),
        cache.ttl().as_millis() as u64,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
