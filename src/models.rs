//! Core data models for divgrade
//!
//! These models are shared by the grading engine, the quote collector,
//! the insights report and the publication feeds.

use serde::{Deserialize, Serialize};

/// Per-security inputs to the grading engine.
///
/// All values are percentages and expected to be non-negative. The engine
/// does not validate them; out-of-range values simply fall into the lowest
/// bucket of each scoring term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SecurityMetrics {
    /// Trailing dividend yield (4.2 means 4.2%)
    #[serde(default)]
    pub yield_pct: f64,
    /// Share of earnings paid out as dividends, may exceed 100
    #[serde(default)]
    pub payout_ratio_pct: f64,
    /// Five-year average yield; 0 means no history
    #[serde(default)]
    pub five_year_avg_yield_pct: f64,
    /// Free-text sector label
    #[serde(default)]
    pub sector: String,
}

impl SecurityMetrics {
    pub fn new(yield_pct: f64, payout_ratio_pct: f64, five_year_avg_yield_pct: f64, sector: &str) -> Self {
        Self {
            yield_pct,
            payout_ratio_pct,
            five_year_avg_yield_pct,
            sector: sector.to_string(),
        }
    }

    /// REITs must distribute most of their income, so they get their own payout curve.
    pub fn is_reit(&self) -> bool {
        let sector = self.sector.trim();
        sector.eq_ignore_ascii_case("Real Estate") || sector.to_uppercase().contains("REIT")
    }

    /// Whether a historical reference yield is available
    pub fn has_history(&self) -> bool {
        self.five_year_avg_yield_pct > 0.0
    }
}

/// Dividend quality tier, S highest.
///
/// Ordering follows quality: `Grade::S > Grade::A > Grade::B > Grade::C`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Grade {
    #[default]
    C,
    B,
    A,
    S,
}

impl Grade {
    /// All grades, best first
    pub fn all() -> [Grade; 4] {
        [Grade::S, Grade::A, Grade::B, Grade::C]
    }

    pub fn letter(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        }
    }

    /// Label shown to readers of the given locale
    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, Grade::S) => "S-Tier",
            (Locale::En, Grade::A) => "A-Tier",
            (Locale::En, Grade::B) => "B-Tier",
            (Locale::En, Grade::C) => "C-Tier",
            (Locale::Ko, Grade::S) => "S등급",
            (Locale::Ko, Grade::A) => "A등급",
            (Locale::Ko, Grade::B) => "B등급",
            (Locale::Ko, Grade::C) => "C등급",
            (Locale::Pt, Grade::S) => "Classe S",
            (Locale::Pt, Grade::A) => "Classe A",
            (Locale::Pt, Grade::B) => "Classe B",
            (Locale::Pt, Grade::C) => "Classe C",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl std::str::FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "S" => Ok(Grade::S),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            other => Err(format!("unknown grade '{}'", other)),
        }
    }
}

/// Site locale. Each locale owns an independent publication feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
    Pt,
}

impl Locale {
    pub fn all() -> [Locale; 3] {
        [Locale::En, Locale::Ko, Locale::Pt]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ko => "ko",
            Locale::Pt => "pt",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ko" => Ok(Locale::Ko),
            "pt" => Ok(Locale::Pt),
            other => Err(format!("unknown locale '{}' (expected en, ko or pt)", other)),
        }
    }
}

/// One generated content item in a publication feed.
///
/// On disk the uniqueness key is stored under `link`; it is the only
/// required field. Keys this type does not know are carried in `extra`
/// so rewriting a feed never loses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    #[serde(default)]
    pub title: String,
    /// ISO 8601 calendar date
    #[serde(default)]
    pub date: String,
    #[serde(rename = "link")]
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PublicationRecord {
    pub fn new(key: impl Into<String>, title: impl Into<String>, date: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            date: date.into(),
            summary: summary.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A normalized, graded security as it appears in the insights report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendProfile {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub current_price: f64,
    pub dividend_yield: f64,
    pub annual_dividend: f64,
    pub payout_ratio: f64,
    pub five_year_avg_yield: f64,
    pub grade: Grade,
    pub last_updated: String,
}
