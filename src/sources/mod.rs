//! Upstream quote providers.
//!
//! Both providers are unofficial and undocumented. Clients return `Err` only
//! for transport failures; anything that arrives but does not look as
//! expected is reported as missing data.

mod price;
mod valuation;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::Valuation;

pub use price::PriceClient;
pub use valuation::{parse_valuation_page, to_exchange_prefixed, ValuationClient};

/// Source A refuses requests without a browser identity.
pub const PRICE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source B serves a consent or block page to non-browser callers.
pub const VALUATION_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:109.0) Gecko/20100101 Firefox/115.0";

/// Provides the current market price for a ticker.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// `Ok(None)` when the provider answered without a usable price.
    async fn fetch_price(&self, ticker: &str) -> Result<Option<f64>, SourceError>;
}

/// Provides valuation ratio and latest earnings for a ticker.
#[async_trait]
pub trait ValuationSource: Send + Sync {
    /// Fields the page does not carry come back as `None`.
    async fn fetch_valuation(&self, ticker: &str) -> Result<Valuation, SourceError>;
}

fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, SourceError> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
