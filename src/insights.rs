//! Dividend insights report
//!
//! Grades every security in the configured universe and produces the
//! yield-sorted report the site's listing pages read.

use crate::collector::{self, QuoteError, QuoteOutcome, RawQuote};
use crate::config::UniverseConfig;
use crate::feed::write_atomic;
use crate::models::{DividendProfile, Grade};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// The persisted report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    pub generated_at: String,
    pub total_stocks: usize,
    pub stocks: Vec<DividendProfile>,
}

impl InsightsReport {
    /// Count of stocks per grade, best first
    pub fn grade_counts(&self) -> BTreeMap<std::cmp::Reverse<Grade>, usize> {
        let mut counts = BTreeMap::new();
        for stock in &self.stocks {
            *counts.entry(std::cmp::Reverse(stock.grade)).or_insert(0) += 1;
        }
        counts
    }

    /// Write the report as pretty JSON through a temp file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes())
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}

/// What happened to the rest of the universe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSummary {
    /// Securities with a graded quote that made the report
    pub listed: usize,
    /// Paid no dividend, had no quote, or fell under the yield floor
    pub no_data: Vec<String>,
    pub corrupt: Vec<QuoteError>,
}

/// Normalize quotes for the universe.
///
/// With `all` set every quote is graded; otherwise only universe tickers
/// are, and a universe ticker with no quote counts as no data.
pub fn collect(
    universe: &UniverseConfig,
    quotes: &[RawQuote],
    all: bool,
    timestamp: &str,
) -> Vec<QuoteOutcome> {
    if all {
        return quotes
            .iter()
            .map(|q| collector::normalize(q, timestamp))
            .collect();
    }

    let by_ticker: HashMap<String, &RawQuote> = quotes
        .iter()
        .map(|q| (q.ticker.trim().to_uppercase(), q))
        .collect();

    universe
        .tickers()
        .into_iter()
        .enumerate()
        .map(|(i, ticker)| {
            debug!("[{}] Processing {}", i + 1, ticker);
            match by_ticker.get(&ticker) {
                Some(quote) => collector::normalize(quote, timestamp),
                None => QuoteOutcome::NoData { ticker },
            }
        })
        .collect()
}

/// Build the report from normalized outcomes
pub fn build(
    outcomes: Vec<QuoteOutcome>,
    min_yield: f64,
    generated_at: &str,
) -> (InsightsReport, CollectionSummary) {
    let mut summary = CollectionSummary::default();
    let mut stocks = Vec::new();

    for outcome in outcomes {
        match outcome {
            QuoteOutcome::Quoted(profile) if profile.dividend_yield > min_yield => {
                stocks.push(profile)
            }
            QuoteOutcome::Quoted(profile) => summary.no_data.push(profile.ticker),
            QuoteOutcome::NoData { ticker } => summary.no_data.push(ticker),
            QuoteOutcome::Corrupt(e) => summary.corrupt.push(e),
        }
    }

    stocks.sort_by(|a, b| b.dividend_yield.total_cmp(&a.dividend_yield));
    summary.listed = stocks.len();

    info!(
        "Insights: {} listed, {} without data, {} corrupt",
        summary.listed,
        summary.no_data.len(),
        summary.corrupt.len()
    );

    (
        InsightsReport {
            generated_at: generated_at.to_string(),
            total_stocks: stocks.len(),
            stocks,
        },
        summary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(ticker: &str, yield_frac: f64, payout_frac: f64) -> RawQuote {
        RawQuote {
            ticker: ticker.to_string(),
            dividend_yield: Some(yield_frac),
            payout_ratio: Some(payout_frac),
            sector: Some("Consumer Defensive".into()),
            ..Default::default()
        }
    }

    fn universe(tickers: &[&str]) -> UniverseConfig {
        let mut categories = BTreeMap::new();
        categories.insert(
            "test".to_string(),
            tickers.iter().map(|t| t.to_string()).collect(),
        );
        UniverseConfig { categories }
    }

    #[test]
    fn test_report_sorted_by_yield() {
        let quotes = vec![
            quote("KO", 0.031, 0.68),
            quote("MO", 0.082, 0.77),
            quote("PG", 0.024, 0.6),
        ];
        let outcomes = collect(&universe(&["KO", "MO", "PG"]), &quotes, false, "t");
        let (report, summary) = build(outcomes, 0.0, "2026-01-05 10:00:00");

        let order: Vec<&str> = report.stocks.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["MO", "KO", "PG"]);
        assert_eq!(report.total_stocks, 3);
        assert_eq!(summary.listed, 3);
        assert_eq!(report.generated_at, "2026-01-05 10:00:00");
    }

    #[test]
    fn test_universe_ticker_without_quote_is_no_data() {
        let quotes = vec![quote("KO", 0.031, 0.68), quote("XYZ", 0.05, 0.4)];
        let outcomes = collect(&universe(&["ko", "VZ"]), &quotes, false, "t");
        let (report, summary) = build(outcomes, 0.0, "t");

        assert_eq!(report.stocks.len(), 1);
        assert_eq!(summary.no_data, vec!["VZ".to_string()]);
    }

    #[test]
    fn test_all_ignores_universe() {
        let quotes = vec![quote("XYZ", 0.05, 0.4)];
        let outcomes = collect(&universe(&["KO"]), &quotes, true, "t");
        let (report, _) = build(outcomes, 0.0, "t");
        assert_eq!(report.stocks[0].ticker, "XYZ");
    }

    #[test]
    fn test_min_yield_floor_and_corrupt_tally() {
        let mut bad = quote("BAD", 0.03, 0.5);
        bad.payout_ratio = Some(f64::NAN);
        let quotes = vec![quote("PG", 0.024, 0.6), quote("MO", 0.082, 0.77), bad];
        let outcomes = collect(&universe(&["PG", "MO", "BAD"]), &quotes, false, "t");
        let (report, summary) = build(outcomes, 3.0, "t");

        assert_eq!(report.stocks.len(), 1);
        assert_eq!(report.stocks[0].ticker, "MO");
        assert_eq!(summary.no_data, vec!["PG".to_string()]);
        assert_eq!(summary.corrupt.len(), 1);
    }

    #[test]
    fn test_grade_counts_best_first() {
        let quotes = vec![quote("MO", 0.082, 0.77), quote("KO", 0.031, 0.45)];
        let outcomes = collect(&universe(&["MO", "KO"]), &quotes, false, "t");
        let (report, _) = build(outcomes, 0.0, "t");
        let counts: Vec<(Grade, usize)> = report
            .grade_counts()
            .into_iter()
            .map(|(g, n)| (g.0, n))
            .collect();
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 2);
        assert!(counts.windows(2).all(|w| w[0].0 > w[1].0));
    }

    #[test]
    fn test_save_replaces_report_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("dividend_insights.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        let quotes = vec![quote("KO", 0.031, 0.68)];
        let outcomes = collect(&universe(&["KO"]), &quotes, false, "t");
        let (report, _) = build(outcomes, 0.0, "2026-01-05 10:00:00");
        report.save(&path).unwrap();

        let loaded: InsightsReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
        let names: Vec<String> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["dividend_insights.json".to_string()]);
    }
}
