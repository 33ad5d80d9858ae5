//! Project-level configuration support
//!
//! Loads per-site configuration from `divgrade.toml` or `.divgraderc.json`
//! in the site root, falling back to the user config directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # divgrade.toml
//!
//! [universe.categories]
//! dividend_etfs = ["SCHD", "VYM"]
//! reits = ["O", "PLD"]
//!
//! [feed]
//! cap = 20
//! partitions = [
//!     { locale = "en", path = "posts.json" },
//!     { locale = "ko", path = "ko/posts.json" },
//! ]
//!
//! [insights]
//! output = "dividend_insights.json"
//! min_yield = 0.0
//!
//! [calculator]
//! tax_rate = 0.15
//! ```

use crate::feed::{Partition, PartitionSet, PublicationIndex, DEFAULT_CAP};
use crate::models::Locale;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "divgrade.toml";
const JSON_CONFIG_FILE_NAME: &str = ".divgraderc.json";

/// Complete site configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub universe: UniverseConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub insights: InsightsConfig,

    #[serde(default)]
    pub calculator: CalculatorConfig,
}

impl ProjectConfig {
    /// Reject values no command could work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.feed.cap == 0 {
            anyhow::bail!("feed.cap must be at least 1");
        }
        if self.feed.lease_stale_after_ms == 0 {
            anyhow::bail!("feed.lease_stale_after_ms must be at least 1");
        }
        let mut seen = HashSet::new();
        for partition in &self.feed.partitions {
            if !seen.insert(partition.locale) {
                anyhow::bail!("feed.partitions lists locale '{}' twice", partition.locale);
            }
        }
        if !(0.0..1.0).contains(&self.calculator.tax_rate) {
            anyhow::bail!(
                "calculator.tax_rate must be in [0, 1), got {}",
                self.calculator.tax_rate
            );
        }
        Ok(())
    }
}

/// Securities the insights report covers, grouped by category
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UniverseConfig {
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
        }
    }
}

impl UniverseConfig {
    /// All tickers, upper-cased and deduplicated, in category order
    pub fn tickers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.categories
            .values()
            .flatten()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect()
    }
}

fn default_categories() -> BTreeMap<String, Vec<String>> {
    let groups: [(&str, &[&str]); 5] = [
        (
            "dividend_etfs",
            &["SCHD", "VYM", "DGRO", "NOBL", "VIG", "SDY", "DVY", "HDV", "SPYD", "FVD"],
        ),
        (
            "dividend_aristocrats",
            &[
                "JNJ", "PG", "KO", "PEP", "MCD", "WMT", "TGT", "LOW", "HD", "CAT", "MMM", "CL",
                "GPC", "SYY", "ADM", "BF-B", "ABBV", "ABT", "CVX", "XOM",
            ],
        ),
        (
            "high_yield",
            &["O", "T", "MO", "BTI", "VZ", "IBM", "AGNC", "NLY", "ARR", "DX"],
        ),
        (
            "dividend_growth",
            &[
                "MSFT", "AAPL", "V", "MA", "UNH", "JPM", "BAC", "WFC", "BLK", "GS", "AVGO", "TXN",
                "QCOM", "CSCO", "ORCL", "ACN", "ADP", "PAYX",
            ],
        ),
        (
            "reits",
            &["AMT", "PLD", "EQIX", "PSA", "DLR", "SPG", "WELL", "AVB", "EQR", "VTR"],
        ),
    ];
    groups
        .iter()
        .map(|(name, tickers)| {
            (
                name.to_string(),
                tickers.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

/// One locale's feed location
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PartitionConfig {
    pub locale: Locale,
    /// Feed file, relative to the site root unless absolute
    pub path: PathBuf,
}

/// Publication feed settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FeedConfig {
    /// Records kept per feed
    #[serde(default = "default_cap")]
    pub cap: usize,

    /// How long to wait for another writer's lease (milliseconds)
    #[serde(default = "default_lease_timeout_ms")]
    pub lease_timeout_ms: u64,

    /// A lease held longer than this is treated as abandoned (milliseconds)
    #[serde(default = "default_lease_stale_after_ms")]
    pub lease_stale_after_ms: u64,

    #[serde(default = "default_partitions")]
    pub partitions: Vec<PartitionConfig>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cap: default_cap(),
            lease_timeout_ms: default_lease_timeout_ms(),
            lease_stale_after_ms: default_lease_stale_after_ms(),
            partitions: default_partitions(),
        }
    }
}

fn default_cap() -> usize {
    DEFAULT_CAP
}
fn default_lease_timeout_ms() -> u64 {
    5000
}
fn default_lease_stale_after_ms() -> u64 {
    60_000
}
fn default_partitions() -> Vec<PartitionConfig> {
    vec![
        PartitionConfig {
            locale: Locale::En,
            path: PathBuf::from("posts.json"),
        },
        PartitionConfig {
            locale: Locale::Ko,
            path: PathBuf::from("ko/posts.json"),
        },
        PartitionConfig {
            locale: Locale::Pt,
            path: PathBuf::from("pt/posts.json"),
        },
    ]
}

impl FeedConfig {
    /// Build the feed partitions rooted at `site_root`
    pub fn partition_set(&self, site_root: &Path) -> PartitionSet {
        let timeout = Duration::from_millis(self.lease_timeout_ms);
        let stale_after = Duration::from_millis(self.lease_stale_after_ms);
        PartitionSet::new(
            self.partitions
                .iter()
                .map(|p| Partition {
                    locale: p.locale,
                    index: PublicationIndex::new(site_root.join(&p.path), self.cap)
                        .with_lease_timeout(timeout)
                        .with_lease_stale_after(stale_after),
                })
                .collect(),
        )
    }
}

/// Insights report settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InsightsConfig {
    /// Report file, relative to the site root unless absolute
    #[serde(default = "default_insights_output")]
    pub output: PathBuf,

    /// Only securities yielding more than this (percent) are listed
    #[serde(default)]
    pub min_yield: f64,

    /// Rows shown in the terminal summary
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            output: default_insights_output(),
            min_yield: 0.0,
            top: default_top(),
        }
    }
}

fn default_insights_output() -> PathBuf {
    PathBuf::from("dividend_insights.json")
}
fn default_top() -> usize {
    10
}

/// Defaults for the growth calculator
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CalculatorConfig {
    /// Withholding tax on dividends before reinvestment
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
        }
    }
}

fn default_tax_rate() -> f64 {
    0.15
}

/// User-level config file (`<config_dir>/divgrade/config.toml`)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("divgrade").join("config.toml"))
}

/// Load project configuration from the site root.
///
/// Searches for configuration files in this order:
/// 1. `divgrade.toml`
/// 2. `.divgraderc.json`
/// 3. the user config file
///
/// A file that fails to parse is logged and skipped. Returns the default
/// configuration if nothing usable is found.
pub fn load_project_config(site_root: &Path) -> ProjectConfig {
    let mut candidates = vec![
        site_root.join(CONFIG_FILE_NAME),
        site_root.join(JSON_CONFIG_FILE_NAME),
    ];
    if let Some(user) = user_config_path() {
        candidates.push(user);
    }

    for path in candidates.iter().filter(|p| p.exists()) {
        match load_file(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", path.display(), e);
            }
        }
    }

    debug!("No config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration, preferring an explicit file.
///
/// An explicit path must exist and parse; discovery never fails.
pub fn load_config(explicit: Option<&Path>, site_root: &Path) -> anyhow::Result<ProjectConfig> {
    let config = match explicit {
        Some(path) => load_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_project_config(site_root),
    };
    config.validate()?;
    Ok(config)
}

fn load_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let config = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}

/// Written by `divgrade init`
pub const EXAMPLE_CONFIG: &str = r#"# divgrade configuration

[universe.categories]
dividend_etfs = ["SCHD", "VYM", "DGRO", "NOBL", "VIG"]
dividend_aristocrats = ["JNJ", "PG", "KO", "PEP", "MCD"]
high_yield = ["O", "T", "MO", "VZ"]
reits = ["AMT", "PLD", "EQIX", "PSA"]

[feed]
# Records kept per feed; older entries fall off
cap = 20
# Wait this long for another writer before giving up
lease_timeout_ms = 5000
# A lease older than this belongs to a writer that died; it is broken
lease_stale_after_ms = 60000
partitions = [
    { locale = "en", path = "posts.json" },
    { locale = "ko", path = "ko/posts.json" },
    { locale = "pt", path = "pt/posts.json" },
]

[insights]
output = "dividend_insights.json"
# Only list securities yielding more than this percentage
min_yield = 0.0
top = 10

[calculator]
# Withholding tax applied to dividends before reinvestment
tax_rate = 0.15
"#;
