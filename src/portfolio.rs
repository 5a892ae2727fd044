//! Portfolio valuation
//!
//! Combines static holdings with live quotes into valued rows, sector
//! totals, and a partial-failure flag for the consumer.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BatchResult, Quote};

/// A static position as supplied by the caller or the holdings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub stock_name: String,
    pub purchase_price: f64,
    pub quantity: f64,
    /// Exchange-suffixed ticker, e.g. `RELIANCE.NS`
    pub exchange_code: String,
    pub sector: String,
}

/// One holding valued at its live quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRow {
    #[serde(flatten)]
    pub holding: Holding,
    pub investment: f64,
    pub portfolio_percent: f64,
    pub price: Option<f64>,
    pub present_value: Option<f64>,
    pub gain_loss: Option<f64>,
    pub gain_loss_percent: Option<f64>,
    pub valuation_ratio: Option<f64>,
    pub latest_earnings: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: String,
    pub total_investment: f64,
    pub total_present_value: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: Option<f64>,
    pub stocks: Vec<PortfolioRow>,
}

/// Full valuation returned by the live portfolio endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub rows: Vec<PortfolioRow>,
    pub sector_summaries: Vec<SectorSummary>,
    pub total_investment: f64,
    pub total_present_value: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: Option<f64>,
    pub last_updated: DateTime<Utc>,
    /// True when any row is missing a price
    pub partial_failure: bool,
}

/// Loads the default holdings from a JSON array on disk.
pub fn load_holdings(path: impl AsRef<Path>) -> anyhow::Result<Vec<Holding>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading holdings file {}", path.display()))?;
    let holdings = serde_json::from_str(&raw)
        .with_context(|| format!("parsing holdings file {}", path.display()))?;
    Ok(holdings)
}

/// Tickers to request for `holdings`, in holding order (duplicates kept).
pub fn tickers(holdings: &[Holding]) -> Vec<String> {
    holdings.iter().map(|h| h.exchange_code.clone()).collect()
}

/// Values `holdings` against `quotes`.
///
/// A holding with no entry in `quotes` is valued as if its quote were empty.
pub fn build_snapshot(holdings: &[Holding], quotes: &BatchResult) -> PortfolioSnapshot {
    let total_investment: f64 = holdings.iter().map(|h| h.purchase_price * h.quantity).sum();

    let empty = Quote::empty();
    let rows: Vec<PortfolioRow> = holdings
        .iter()
        .map(|h| build_row(h, total_investment, quotes.get(&h.exchange_code).unwrap_or(&empty)))
        .collect();

    let partial_failure = rows.iter().any(|r| r.price.is_none());
    let total_present_value: f64 = rows.iter().filter_map(|r| r.present_value).sum();
    let total_gain_loss = total_present_value - total_investment;

    PortfolioSnapshot {
        sector_summaries: group_by_sector(&rows),
        rows,
        total_investment,
        total_present_value,
        total_gain_loss,
        total_gain_loss_percent: percent_of(total_gain_loss, total_investment),
        last_updated: Utc::now(),
        partial_failure,
    }
}

/// Values a single holding against its quote.
pub fn build_row(holding: &Holding, total_investment: f64, quote: &Quote) -> PortfolioRow {
    let investment = holding.purchase_price * holding.quantity;
    let portfolio_percent = if total_investment > 0.0 {
        investment / total_investment * 100.0
    } else {
        0.0
    };
    let present_value = quote.price.map(|p| p * holding.quantity);
    let gain_loss = present_value.map(|pv| pv - investment);

    PortfolioRow {
        holding: holding.clone(),
        investment,
        portfolio_percent,
        price: quote.price,
        present_value,
        gain_loss,
        gain_loss_percent: gain_loss.and_then(|gl| percent_of(gl, investment)),
        valuation_ratio: quote.valuation_ratio,
        latest_earnings: quote.latest_earnings.clone(),
    }
}

/// Groups rows by sector, keeping sectors in order of first appearance.
pub fn group_by_sector(rows: &[PortfolioRow]) -> Vec<SectorSummary> {
    let mut groups: Vec<(String, Vec<PortfolioRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(s, _)| *s == row.holding.sector) {
            Some((_, stocks)) => stocks.push(row.clone()),
            None => groups.push((row.holding.sector.clone(), vec![row.clone()])),
        }
    }

    groups
        .into_iter()
        .map(|(sector, stocks)| {
            let total_investment: f64 = stocks.iter().map(|s| s.investment).sum();
            let total_present_value: f64 = stocks.iter().filter_map(|s| s.present_value).sum();
            let total_gain_loss = total_present_value - total_investment;
            SectorSummary {
                sector,
                total_investment,
                total_present_value,
                total_gain_loss,
                total_gain_loss_percent: percent_of(total_gain_loss, total_investment),
                stocks,
            }
        })
        .collect()
}

fn percent_of(part: f64, whole: f64) -> Option<f64> {
    (whole > 0.0).then(|| part / whole * 100.0)
}
