//! Ticker Fetcher
//!
//! Per-ticker pipeline: fresh cache lookup, concurrent provider calls under
//! retry, write-through on success, and stale or empty fallback on failure.
//! `fetch` never fails; degraded data is preferred over an error.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::error::SourceError;
use crate::models::{Quote, TickerResult, Valuation};
use crate::retry::{retry, RetryPolicy};
use crate::sources::{PriceSource, ValuationSource};

/// Quote cache shared between the fetcher and the stats endpoint.
pub type SharedCache = Arc<RwLock<TtlCache<Quote>>>;

pub struct TickerFetcher {
    cache: SharedCache,
    price: Arc<dyn PriceSource>,
    valuation: Arc<dyn ValuationSource>,
    policy: RetryPolicy,
}

impl TickerFetcher {
    pub fn new(
        cache: SharedCache,
        price: Arc<dyn PriceSource>,
        valuation: Arc<dyn ValuationSource>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            price,
            valuation,
            policy,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Returns the best available quote for `ticker`, stamped with the
    /// current time.
    ///
    /// A fresh cached quote is returned without touching the providers.
    /// Otherwise both providers are queried concurrently; the merged quote
    /// is cached only when neither call failed. If either call still fails
    /// after retries the whole fetch counts as failed and the last stored
    /// quote, or an empty one, is returned instead.
    pub async fn fetch(&self, ticker: &str) -> TickerResult {
        // Write lock: an expired read demotes the entry.
        let cached = self.cache.write().await.get(ticker);
        if let Some(quote) = cached {
            debug!(ticker, "Cache hit");
            return TickerResult::now(quote);
        }
        debug!(ticker, "Cache miss");

        match self.fetch_live(ticker).await {
            Ok(quote) => {
                self.cache.write().await.set(ticker, quote.clone());
                TickerResult::now(quote)
            }
            Err(err) => {
                warn!(ticker, error = %err, "Live fetch failed after retries");
                TickerResult::now(self.fallback(ticker).await)
            }
        }
    }

    async fn fetch_live(&self, ticker: &str) -> Result<Quote, SourceError> {
        let (price, valuation) = tokio::join!(
            retry(self.policy, || self.price.fetch_price(ticker)),
            retry(self.policy, || self.valuation.fetch_valuation(ticker)),
        );
        let (price, valuation): (Option<f64>, Valuation) = (price?, valuation?);
        Ok(Quote::from_parts(price, valuation))
    }

    async fn fallback(&self, ticker: &str) -> Quote {
        match self.cache.read().await.get_stale(ticker) {
            Some(stale) => {
                info!(ticker, "Serving stale quote");
                stale
            }
            None => {
                warn!(ticker, "No stale quote available, returning empty quote");
                Quote::empty()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::cache::ManualClock;

    /// Scripted price provider. Tickers missing from the script fail.
    #[derive(Default)]
    pub(crate) struct FakePrice {
        pub prices: HashMap<String, Option<f64>>,
        pub panic_on: Option<String>,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for FakePrice {
        async fn fetch_price(&self, ticker: &str) -> Result<Option<f64>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic_on.as_deref() == Some(ticker) {
                panic!("price pipeline blew up for {}", ticker);
            }
            self.prices
                .get(ticker)
                .copied()
                .ok_or_else(|| SourceError::Unavailable(format!("no route to {}", ticker)))
        }
    }

    /// Scripted valuation provider. Tickers missing from the script fail.
    #[derive(Default)]
    pub(crate) struct FakeValuation {
        pub pages: HashMap<String, Valuation>,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl ValuationSource for FakeValuation {
        async fn fetch_valuation(&self, ticker: &str) -> Result<Valuation, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(ticker)
                .cloned()
                .ok_or_else(|| SourceError::Unavailable(format!("no route to {}", ticker)))
        }
    }

    pub(crate) fn valuation(ratio: Option<f64>, earnings: Option<&str>) -> Valuation {
        Valuation {
            valuation_ratio: ratio,
            latest_earnings: earnings.map(str::to_string),
        }
    }

    struct Harness {
        fetcher: TickerFetcher,
        price: Arc<FakePrice>,
        valuation: Arc<FakeValuation>,
        clock: Arc<ManualClock>,
    }

    fn harness(price: FakePrice, valuation: FakeValuation) -> Harness {
        let clock = Arc::new(ManualClock::new(0));
        let cache = Arc::new(RwLock::new(TtlCache::with_clock(
            Duration::from_secs(15),
            clock.clone(),
        )));
        let price = Arc::new(price);
        let valuation = Arc::new(valuation);
        let fetcher = TickerFetcher::new(
            cache,
            price.clone(),
            valuation.clone(),
            RetryPolicy::default(),
        );
        Harness {
            fetcher,
            price,
            valuation,
            clock,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_fetches_and_caches() {
        let h = harness(
            FakePrice {
                prices: HashMap::from([("RELIANCE.NS".to_string(), Some(2500.0))]),
                ..Default::default()
            },
            FakeValuation {
                pages: HashMap::from([(
                    "RELIANCE.NS".to_string(),
                    valuation(Some(22.1), Some("Q4 2025")),
                )]),
                ..Default::default()
            },
        );

        let result = h.fetcher.fetch("RELIANCE.NS").await;
        assert_eq!(result.quote.price, Some(2500.0));
        assert_eq!(result.quote.valuation_ratio, Some(22.1));
        assert_eq!(result.quote.latest_earnings.as_deref(), Some("Q4 2025"));

        // Second call within TTL is served from cache
        let again = h.fetcher.fetch("RELIANCE.NS").await;
        assert_eq!(again.quote, result.quote);
        assert_eq!(h.price.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.valuation.calls.load(Ordering::SeqCst), 1);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_miss_and_hit_are_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let h = harness(
            FakePrice {
                prices: HashMap::from([("TCS.NS".to_string(), Some(3600.0))]),
                ..Default::default()
            },
            FakeValuation {
                pages: HashMap::from([("TCS.NS".to_string(), valuation(None, None))]),
                ..Default::default()
            },
        );
        h.fetcher.fetch("TCS.NS").await;
        h.fetcher.fetch("TCS.NS").await;

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Cache miss"), "missing miss log in:\n{}", output);
        assert!(output.contains("Cache hit"), "missing hit log in:\n{}", output);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched() {
        let h = harness(
            FakePrice {
                prices: HashMap::from([("TCS.NS".to_string(), Some(3600.0))]),
                ..Default::default()
            },
            FakeValuation {
                pages: HashMap::from([("TCS.NS".to_string(), valuation(None, None))]),
                ..Default::default()
            },
        );

        h.fetcher.fetch("TCS.NS").await;
        h.clock.advance(Duration::from_secs(16));
        h.fetcher.fetch("TCS.NS").await;

        assert_eq!(h.price.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_sources_failing_yields_empty_quote() {
        let h = harness(FakePrice::default(), FakeValuation::default());

        let result = h.fetcher.fetch("X").await;

        assert!(result.quote.is_empty());
        // One attempt plus one retry per source
        assert_eq!(h.price.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.valuation.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.fetcher.cache().read().await.get_stale("X"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_serves_stale_with_fresh_timestamp() {
        let h = harness(FakePrice::default(), FakeValuation::default());
        let stale = Quote {
            price: Some(100.0),
            valuation_ratio: None,
            latest_earnings: None,
        };
        h.fetcher.cache().write().await.set("X", stale.clone());
        h.clock.advance(Duration::from_secs(60));

        let before = chrono::Utc::now();
        let result = h.fetcher.fetch("X").await;

        assert_eq!(result.quote, stale);
        assert!(result.timestamp >= before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_source_failing_discards_the_other() {
        let h = harness(
            FakePrice {
                prices: HashMap::from([("INFY.NS".to_string(), Some(1500.0))]),
                ..Default::default()
            },
            FakeValuation::default(),
        );

        let result = h.fetcher.fetch("INFY.NS").await;

        // Price succeeded but the ticker as a whole failed
        assert!(result.quote.is_empty());
        assert_eq!(h.fetcher.cache().read().await.get_stale("INFY.NS"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_fields_are_cached_not_retried() {
        let h = harness(
            FakePrice {
                prices: HashMap::from([("DELISTED.NS".to_string(), None)]),
                ..Default::default()
            },
            FakeValuation {
                pages: HashMap::from([("DELISTED.NS".to_string(), valuation(None, None))]),
                ..Default::default()
            },
        );

        let result = h.fetcher.fetch("DELISTED.NS").await;

        assert!(result.quote.is_empty());
        assert_eq!(h.price.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.fetcher.cache().read().await.get_stale("DELISTED.NS"),
            Some(Quote::empty())
        );
    }
}
