//! Source A: price from a JSON chart endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{http_client, PriceSource, PRICE_USER_AGENT};
use crate::error::SourceError;

/// Response shape: `chart.result[0].meta.regularMarketPrice`.
///
/// Every level is optional so that a reshaped payload decodes to `None`
/// rather than failing.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<serde_json::Value>,
}

/// HTTP client for the price provider.
#[derive(Debug, Clone)]
pub struct PriceClient {
    client: reqwest::Client,
    base_url: String,
}

impl PriceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(PRICE_USER_AGENT, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn quote_url(&self, ticker: &str) -> String {
        format!(
            "{}/{}?interval=1d&range=1d",
            self.base_url,
            urlencoding::encode(ticker)
        )
    }
}

#[async_trait]
impl PriceSource for PriceClient {
    async fn fetch_price(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
        let response = self.client.get(self.quote_url(ticker)).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(ticker, %status, "Price provider returned non-success status");
            return Ok(None);
        }

        let body = response.text().await?;
        let price = extract_price(&body);
        match price {
            Some(price) => debug!(ticker, price, "Fetched price"),
            None => warn!(ticker, "No usable price in provider response"),
        }
        Ok(price)
    }
}

/// Pulls a positive, finite price out of a chart response body.
fn extract_price(body: &str) -> Option<f64> {
    let parsed: ChartResponse = serde_json::from_str(body).ok()?;
    parsed
        .chart?
        .result?
        .into_iter()
        .next()?
        .meta?
        .regular_market_price?
        .as_f64()
        .filter(|price| price.is_finite() && *price > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chart_body(price: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "chart": {
                "result": [{ "meta": { "symbol": "RELIANCE.NS", "regularMarketPrice": price } }],
                "error": null
            }
        })
    }

    fn client_for(server: &MockServer) -> PriceClient {
        PriceClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_extract_price() {
        let body = chart_body(serde_json::json!(2500.5)).to_string();
        assert_eq!(extract_price(&body), Some(2500.5));
    }

    #[test]
    fn test_extract_price_rejects_bad_values() {
        for bad in [
            serde_json::json!(0),
            serde_json::json!(-12.0),
            serde_json::json!("2500"),
            serde_json::json!(null),
        ] {
            let body = chart_body(bad.clone()).to_string();
            assert_eq!(extract_price(&body), None, "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_extract_price_unexpected_shapes() {
        assert_eq!(extract_price("not json"), None);
        assert_eq!(extract_price("{}"), None);
        assert_eq!(extract_price(r#"{"chart":{"result":[]}}"#), None);
        assert_eq!(extract_price(r#"{"chart":{"result":null}}"#), None);
        assert_eq!(extract_price(r#"{"chart":{"result":[{}]}}"#), None);
    }

    #[tokio::test]
    async fn test_fetch_price_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/RELIANCE.NS"))
            .and(query_param("interval", "1d"))
            .and(query_param("range", "1d"))
            .and(header_exists("user-agent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chart_body(serde_json::json!(2500))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let price = client_for(&server).fetch_price("RELIANCE.NS").await.unwrap();
        assert_eq!(price, Some(2500.0));
    }

    #[tokio::test]
    async fn test_fetch_price_non_success_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let price = client_for(&server).fetch_price("NOPE.NS").await.unwrap();
        assert_eq!(price, None);
    }

    #[tokio::test]
    async fn test_fetch_price_missing_field_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "chart": { "result": [] } })),
            )
            .mount(&server)
            .await;

        let price = client_for(&server).fetch_price("TCS.NS").await.unwrap();
        assert_eq!(price, None);
    }

    #[tokio::test]
    async fn test_fetch_price_unreachable_host_is_error() {
        // Nothing listens on port 1
        let client = PriceClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

        let result = client.fetch_price("TCS.NS").await;
        assert!(matches!(result, Err(SourceError::Network(_))));
    }
}
