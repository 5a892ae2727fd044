//! Quote models shared by the fetch pipeline and the HTTP layer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live metrics for one ticker. Every field may be missing independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Current market price
    pub price: Option<f64>,
    /// Price-to-earnings ratio
    pub valuation_ratio: Option<f64>,
    /// Latest reported earnings, as displayed by the provider
    pub latest_earnings: Option<String>,
}

impl Quote {
    /// Quote with no data at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(price: Option<f64>, valuation: Valuation) -> Self {
        Self {
            price,
            valuation_ratio: valuation.valuation_ratio,
            latest_earnings: valuation.latest_earnings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.valuation_ratio.is_none() && self.latest_earnings.is_none()
    }
}

/// Fields scraped from the valuation provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Valuation {
    pub valuation_ratio: Option<f64>,
    pub latest_earnings: Option<String>,
}

/// A quote stamped with the moment it was handed out.
///
/// The timestamp marks the retrieval, not the market data: a cached or
/// stale quote still carries the time of the current request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerResult {
    #[serde(flatten)]
    pub quote: Quote,
    pub timestamp: DateTime<Utc>,
}

impl TickerResult {
    /// Stamps `quote` with the current time.
    pub fn now(quote: Quote) -> Self {
        Self {
            quote,
            timestamp: Utc::now(),
        }
    }
}

/// Quotes keyed by ticker, one entry per unique requested ticker.
pub type BatchResult = HashMap<String, Quote>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_quote() {
        let quote = Quote::empty();
        assert!(quote.is_empty());
        assert_eq!(quote.price, None);
    }

    #[test]
    fn test_from_parts() {
        let valuation = Valuation {
            valuation_ratio: Some(22.1),
            latest_earnings: Some("Q4 2025".to_string()),
        };
        let quote = Quote::from_parts(Some(2500.0), valuation);
        assert_eq!(quote.price, Some(2500.0));
        assert_eq!(quote.valuation_ratio, Some(22.1));
        assert_eq!(quote.latest_earnings.as_deref(), Some("Q4 2025"));
        assert!(!quote.is_empty());
    }

    #[test]
    fn test_ticker_result_serializes_flat() {
        let result = TickerResult::now(Quote {
            price: Some(100.0),
            valuation_ratio: None,
            latest_earnings: None,
        });
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["price"], 100.0);
        assert!(json["valuationRatio"].is_null());
        assert!(json["latestEarnings"].is_null());
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
