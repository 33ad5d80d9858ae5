//! Quote normalization
//!
//! Turns raw provider quotes into graded [`DividendProfile`]s. Providers are
//! inconsistent about units, so this is where percentages get fixed up:
//!
//! - `dividend_yield` below 1 is a fraction (0.045) and is scaled to percent;
//!   values of 1 or more are taken as percentages already
//! - `payout_ratio` is always a fraction and is scaled to percent
//! - `five_year_avg_dividend_yield` is already a percentage
//!
//! Every quote yields exactly one [`QuoteOutcome`], so callers can tell a
//! security that pays nothing apart from a corrupt record.

use crate::models::{DividendProfile, SecurityMetrics};
use crate::scoring;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Sector recorded when the provider does not report one
pub const UNKNOWN_SECTOR: &str = "N/A";

/// A quote as it arrives from the data provider
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    #[serde(default, alias = "symbol")]
    pub ticker: String,
    #[serde(default, alias = "longName", alias = "shortName")]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default, alias = "regularMarketPrice")]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default, alias = "trailingAnnualDividendRate")]
    pub annual_dividend: Option<f64>,
    #[serde(default)]
    pub payout_ratio: Option<f64>,
    #[serde(default, alias = "fiveYearAvgDividendYield")]
    pub five_year_avg_yield: Option<f64>,
}

/// Why a quote was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("{ticker}: {field} is negative ({value})")]
    Negative {
        ticker: String,
        field: &'static str,
        value: f64,
    },

    #[error("{ticker}: {field} is not a finite number")]
    NotFinite { ticker: String, field: &'static str },

    #[error("quote has no ticker")]
    MissingTicker,
}

/// Result of normalizing one quote
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Quoted(DividendProfile),
    /// Valid quote for a security that pays no dividend
    NoData { ticker: String },
    Corrupt(QuoteError),
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Validate an optional numeric field; missing becomes 0
fn field(ticker: &str, name: &'static str, value: Option<f64>) -> Result<f64, QuoteError> {
    match value {
        None => Ok(0.0),
        Some(v) if !v.is_finite() => Err(QuoteError::NotFinite {
            ticker: ticker.to_string(),
            field: name,
        }),
        Some(v) if v < 0.0 => Err(QuoteError::Negative {
            ticker: ticker.to_string(),
            field: name,
            value: v,
        }),
        Some(v) => Ok(v),
    }
}

/// Scale a yield that may be a fraction to a percentage
pub fn yield_to_pct(raw: f64) -> f64 {
    if raw > 0.0 && raw < 1.0 {
        raw * 100.0
    } else {
        raw
    }
}

/// Metrics the grading engine sees for a quote
fn metrics_for(raw: &RawQuote) -> Result<(SecurityMetrics, f64, f64), QuoteError> {
    let ticker = raw.ticker.trim();
    if ticker.is_empty() {
        return Err(QuoteError::MissingTicker);
    }
    let yield_pct = yield_to_pct(field(ticker, "dividend_yield", raw.dividend_yield)?);
    let payout_pct = field(ticker, "payout_ratio", raw.payout_ratio)? * 100.0;
    let five_year = field(ticker, "five_year_avg_yield", raw.five_year_avg_yield)?;
    let price = field(ticker, "current_price", raw.current_price)?;
    let annual = field(ticker, "annual_dividend", raw.annual_dividend)?;

    let sector = raw
        .sector
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SECTOR);

    Ok((
        SecurityMetrics::new(round2(yield_pct), round2(payout_pct), round2(five_year), sector),
        round2(price),
        round2(annual),
    ))
}

/// Normalize and grade one quote
pub fn normalize(raw: &RawQuote, timestamp: &str) -> QuoteOutcome {
    let (metrics, price, annual) = match metrics_for(raw) {
        Ok(parts) => parts,
        Err(e) => {
            warn!("Rejected quote: {}", e);
            return QuoteOutcome::Corrupt(e);
        }
    };

    let ticker = raw.ticker.trim().to_string();
    if metrics.yield_pct <= 0.0 {
        debug!("{} pays no dividend, skipping", ticker);
        return QuoteOutcome::NoData { ticker };
    }

    let grade = scoring::grade(&metrics);
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&ticker)
        .to_string();

    QuoteOutcome::Quoted(DividendProfile {
        name,
        sector: metrics.sector.clone(),
        current_price: price,
        dividend_yield: metrics.yield_pct,
        annual_dividend: annual,
        payout_ratio: metrics.payout_ratio_pct,
        five_year_avg_yield: metrics.five_year_avg_yield_pct,
        grade,
        last_updated: timestamp.to_string(),
        ticker,
    })
}

/// Load raw quotes from a JSON file.
///
/// Accepts either a bare array of quotes or an object with a `quotes` array.
pub fn load_quotes(path: &Path) -> Result<Vec<RawQuote>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum QuoteFile {
        Bare(Vec<RawQuote>),
        Wrapped { quotes: Vec<RawQuote> },
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read quotes from {}", path.display()))?;
    let file: QuoteFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid quote file {}", path.display()))?;
    Ok(match file {
        QuoteFile::Bare(quotes) | QuoteFile::Wrapped { quotes } => quotes,
    })
}
