//! Source B: valuation ratio and earnings scraped from an HTML quote page.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::{http_client, ValuationSource, VALUATION_USER_AGENT};
use crate::error::SourceError;
use crate::models::Valuation;

const RATIO_SELECTOR: &str = r#"[data-item="pe"]"#;
const EARNINGS_SELECTOR: &str = r#"[data-item="earnings"]"#;

/// HTTP client for the valuation provider.
#[derive(Debug, Clone)]
pub struct ValuationClient {
    client: reqwest::Client,
    base_url: String,
}

impl ValuationClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(VALUATION_USER_AGENT, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn quote_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.base_url, to_exchange_prefixed(ticker))
    }
}

#[async_trait]
impl ValuationSource for ValuationClient {
    async fn fetch_valuation(&self, ticker: &str) -> Result<Valuation, SourceError> {
        let response = self.client.get(self.quote_url(ticker)).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(ticker, %status, "Valuation provider returned non-success status");
            return Ok(Valuation::default());
        }

        let html = response.text().await?;
        let valuation = parse_valuation_page(&html);
        if valuation == Valuation::default() {
            warn!(ticker, "Valuation fields not found on page, selectors may be stale");
        } else {
            debug!(ticker, ?valuation, "Fetched valuation");
        }
        Ok(valuation)
    }
}

/// Translates a suffixed ticker into the provider's `EXCHANGE:SYMBOL` form.
///
/// `.NS` maps to `NSE`, `.BO` to `BSE`; a ticker without either suffix is
/// assumed to trade on `NSE`.
pub fn to_exchange_prefixed(ticker: &str) -> String {
    let ticker = ticker.trim();
    let (symbol, exchange) = if let Some(symbol) = ticker.strip_suffix(".BO") {
        (symbol, "BSE")
    } else if let Some(symbol) = ticker.strip_suffix(".NS") {
        (symbol, "NSE")
    } else {
        (ticker, "NSE")
    };
    format!("{}:{}", exchange, urlencoding::encode(symbol))
}

/// Extracts valuation fields from a quote page.
///
/// The ratio is the last `data-item="pe"` element whose text yields a
/// number once non-numeric characters are stripped. Earnings is the trimmed
/// text of the first `data-item="earnings"` element. Absent fields are `None`.
pub fn parse_valuation_page(html: &str) -> Valuation {
    let (Ok(ratio_selector), Ok(earnings_selector)) =
        (Selector::parse(RATIO_SELECTOR), Selector::parse(EARNINGS_SELECTOR))
    else {
        warn!("Valuation selectors failed to compile");
        return Valuation::default();
    };

    let document = Html::parse_document(html);

    let valuation_ratio = document
        .select(&ratio_selector)
        .filter_map(|el| parse_number(&el.text().collect::<String>()))
        .last();

    let latest_earnings = document
        .select(&earnings_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());

    Valuation {
        valuation_ratio,
        latest_earnings,
    }
}

/// Strips everything but digits and dots, then reads the longest numeric
/// prefix: `"18.2 (1.5%)"` becomes `"18.21.5"` and reads as `18.21`.
fn parse_number(raw: &str) -> Option<f64> {
    let mut seen_dot = false;
    let prefix: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .take_while(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect();
    prefix.parse::<f64>().ok().filter(|n| n.is_finite())
}
