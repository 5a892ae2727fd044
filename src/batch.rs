//! Batch Aggregator
//!
//! Fans the ticker fetcher out over a list of tickers.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error};

use crate::fetcher::TickerFetcher;
use crate::models::{BatchResult, Quote, TickerResult};

/// Runs one ticker's fetch in its own task.
///
/// A panic anywhere in the pipeline is contained to that task and reported
/// as an empty quote stamped with the current time.
pub async fn fetch_isolated(fetcher: &Arc<TickerFetcher>, ticker: &str) -> TickerResult {
    let task = {
        let fetcher = Arc::clone(fetcher);
        let ticker = ticker.to_string();
        tokio::spawn(async move { fetcher.fetch(&ticker).await })
    };

    task.await.unwrap_or_else(|err| {
        error!(ticker, error = %err, "Ticker task failed, using empty quote");
        TickerResult::now(Quote::empty())
    })
}

/// Fetches quotes for every unique ticker in `tickers` concurrently.
///
/// Duplicates are fetched once. Each ticker runs in its own task; a task
/// that panics yields an empty quote for its ticker and the rest of the
/// batch is unaffected. The result holds exactly one entry per unique
/// ticker, in no particular order.
///
/// Spawned tasks are detached: if the returned future is dropped, requests
/// already in flight run to completion and their results are discarded.
/// There is no cap on concurrent outbound requests (two per ticker), so
/// this is sized for tens of tickers, not thousands.
pub async fn batch_fetch(fetcher: &Arc<TickerFetcher>, tickers: &[String]) -> BatchResult {
    let mut seen = HashSet::new();
    let unique: Vec<String> = tickers
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect();
    debug!(
        requested = tickers.len(),
        unique = unique.len(),
        "Starting batch fetch"
    );

    let tasks = unique.iter().map(|ticker| fetch_isolated(fetcher, ticker));
    let outcomes = join_all(tasks).await;

    unique
        .into_iter()
        .zip(outcomes)
        .map(|(ticker, outcome)| (ticker, outcome.quote))
        .collect()
}
