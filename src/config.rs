//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default Source A endpoint (chart API, price under `chart.result[0].meta`)
pub const DEFAULT_PRICE_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
/// Default Source B endpoint (HTML quote page)
pub const DEFAULT_VALUATION_BASE_URL: &str = "https://www.google.com/finance/quote";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Quote cache freshness window in milliseconds
    pub cache_ttl_ms: u64,
    /// Retries after the first attempt for each source call
    pub retry_max: u32,
    /// Delay before the first retry in milliseconds, doubled per retry
    pub retry_base_delay_ms: u64,
    /// Per-request timeout for upstream HTTP calls in seconds
    pub request_timeout_secs: u64,
    /// Source A base URL
    pub price_base_url: String,
    /// Source B base URL
    pub valuation_base_url: String,
    /// JSON file holding the default holdings
    pub portfolio_file: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 4000)
    /// - `CACHE_TTL_MS` - Quote freshness window (default: 15000)
    /// - `RETRY_MAX` - Retries per source call (default: 1)
    /// - `RETRY_BASE_DELAY_MS` - First retry delay (default: 500)
    /// - `REQUEST_TIMEOUT_SECS` - Upstream request timeout (default: 10)
    /// - `PRICE_BASE_URL` - Source A endpoint
    /// - `VALUATION_BASE_URL` - Source B endpoint
    /// - `PORTFOLIO_FILE` - Default holdings file (default: data/portfolio.json)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            cache_ttl_ms: parse_var("CACHE_TTL_MS", defaults.cache_ttl_ms),
            retry_max: parse_var("RETRY_MAX", defaults.retry_max),
            retry_base_delay_ms: parse_var("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            price_base_url: env::var("PRICE_BASE_URL").unwrap_or(defaults.price_base_url),
            valuation_base_url: env::var("VALUATION_BASE_URL")
                .unwrap_or(defaults.valuation_base_url),
            portfolio_file: env::var("PORTFOLIO_FILE").unwrap_or(defaults.portfolio_file),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 4000,
            cache_ttl_ms: 15_000,
            retry_max: 1,
            retry_base_delay_ms: 500,
            request_timeout_secs: 10,
            price_base_url: DEFAULT_PRICE_BASE_URL.to_string(),
            valuation_base_url: DEFAULT_VALUATION_BASE_URL.to_string(),
            portfolio_file: "data/portfolio.json".to_string(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
