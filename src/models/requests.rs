//! Request DTOs for the quote service API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

use crate::portfolio::Holding;

/// Query string for the single-ticker lookup (GET /api/stock)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockQuery {
    /// Exchange-suffixed ticker, e.g. `RELIANCE.NS`
    #[serde(default)]
    pub ticker: Option<String>,
}

impl StockQuery {
    /// Returns the trimmed ticker, or an error message when it is missing or blank.
    pub fn ticker(&self) -> Result<&str, String> {
        match self.ticker.as_deref().map(str::trim) {
            Some(ticker) if !ticker.is_empty() => Ok(ticker),
            _ => Err("ticker param is required".to_string()),
        }
    }
}

/// Request body for the live portfolio (POST /api/portfolio/live)
///
/// Accepts either `{"stocks": [...]}` or a bare array of holdings. An object
/// without a `stocks` list decodes to no holdings, which validation rejects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LivePortfolioRequest {
    Bare(Vec<Holding>),
    Wrapped {
        #[serde(default)]
        stocks: Option<Vec<Holding>>,
    },
}

impl LivePortfolioRequest {
    pub fn into_holdings(self) -> Vec<Holding> {
        match self {
            Self::Bare(stocks) => stocks,
            Self::Wrapped { stocks } => stocks.unwrap_or_default(),
        }
    }
}

/// Validates a holdings list before it enters the fetch pipeline.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_holdings(holdings: &[Holding]) -> Option<String> {
    if holdings.is_empty() {
        return Some("stocks array required".to_string());
    }
    if let Some(bad) = holdings.iter().find(|h| h.exchange_code.trim().is_empty()) {
        return Some(format!("exchangeCode missing for '{}'", bad.stock_name));
    }
    None
}
