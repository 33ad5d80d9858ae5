//! CLI command definitions and handlers

mod calc;
mod feed;
mod grade;
mod init;
mod insights;
mod publish;

use crate::config::{self, ProjectConfig};
use crate::models::Locale;
use crate::reporters::OutputFormat;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// divgrade - Dividend quality grades and publication feeds
#[derive(Parser, Debug)]
#[command(name = "divgrade")]
#[command(
    version,
    about = "Grade dividend stocks and keep a dividend research site's feeds up to date",
    after_help = "\
Examples:
  divgrade grade --yield 4.5 --payout 98 --sector \"Real Estate\" --explain
  divgrade insights quotes.json                  Grade the ticker universe
  divgrade publish blog/2026-01-05-SCHD.html --title \"SCHD deep dive\"
  divgrade feed --locale ko                      List the Korean feed
  divgrade calc --principal 10000 --monthly 500 --yield 3.5 --years 20"
)]
pub struct Cli {
    /// Site root holding the feeds and reports (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Config file to use instead of searching the site root
    #[arg(long, global = true, env = "DIVGRADE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example divgrade.toml into the site root
    Init,

    /// Grade one security from its metrics
    Grade {
        /// Dividend yield in percent (4.2 means 4.2%)
        #[arg(long = "yield")]
        yield_pct: f64,

        /// Payout ratio in percent
        #[arg(long, default_value = "0")]
        payout: f64,

        /// Five-year average yield in percent (0 = no history)
        #[arg(long = "avg-yield", default_value = "0")]
        avg_yield: f64,

        /// Sector label; "Real Estate" or anything containing REIT uses the REIT payout curve
        #[arg(long, default_value = "")]
        sector: String,

        /// Show the per-term breakdown
        #[arg(long)]
        explain: bool,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        #[arg(long, default_value = "en", value_parser = ["en", "ko", "pt"])]
        locale: String,
    },

    /// Grade a file of raw quotes and write the insights report
    Insights {
        /// JSON file of provider quotes (array, or object with a `quotes` array)
        quotes: PathBuf,

        /// Report path (default: [insights].output under the site root)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Grade every quote in the file, not just the configured universe
        #[arg(long)]
        all: bool,

        /// Only list securities yielding more than this percentage
        #[arg(long)]
        min_yield: Option<f64>,

        /// Rows shown in the summary
        #[arg(long)]
        top: Option<usize>,

        /// Summary format printed to stdout
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        #[arg(long, default_value = "en", value_parser = ["en", "ko", "pt"])]
        locale: String,
    },

    /// Add one item to every locale feed
    #[command(after_help = "\
--title/--summary apply to every configured locale. --copy overrides one locale:
  divgrade publish blog/x.html --title \"Weekly picks\" --copy \"ko=주간 추천|요약\"
Locales with no copy are skipped.")]
    Publish {
        /// Unique key of the item (its link)
        key: String,

        /// Publication date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        summary: String,

        /// Locale-specific copy as LOCALE=TITLE[|SUMMARY]
        #[arg(long = "copy", value_name = "LOCALE=TITLE[|SUMMARY]")]
        copies: Vec<String>,
    },

    /// List a locale's feed
    Feed {
        #[arg(long, default_value = "en", value_parser = ["en", "ko", "pt"])]
        locale: String,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,
    },

    /// Project dividend reinvestment growth
    Calc {
        /// Starting investment
        #[arg(long, default_value = "10000")]
        principal: f64,

        /// Deposit added at the start of every month
        #[arg(long, default_value = "0")]
        monthly: f64,

        /// Annual dividend yield in percent
        #[arg(long = "yield", default_value = "4")]
        yield_pct: f64,

        /// Annual price growth in percent
        #[arg(long, default_value = "5", allow_negative_numbers = true)]
        growth: f64,

        #[arg(long, default_value = "10")]
        years: u32,

        /// Withholding tax on dividends (default: [calculator].tax_rate)
        #[arg(long)]
        tax_rate: Option<f64>,

        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let root = cli.root.as_path();

    match cli.command {
        Commands::Init => init::run(root),

        Commands::Grade {
            yield_pct,
            payout,
            avg_yield,
            sector,
            explain,
            format,
            locale,
        } => grade::run(
            yield_pct,
            payout,
            avg_yield,
            &sector,
            explain,
            format.parse()?,
            parse_locale(&locale)?,
        ),

        Commands::Insights {
            quotes,
            output,
            all,
            min_yield,
            top,
            format,
            locale,
        } => {
            let config = load_config(cli.config.as_deref(), root)?;
            insights::run(
                root,
                &config,
                &quotes,
                output.as_deref(),
                all,
                min_yield,
                top,
                format.parse()?,
                parse_locale(&locale)?,
            )
        }

        Commands::Publish {
            key,
            date,
            title,
            summary,
            copies,
        } => {
            let config = load_config(cli.config.as_deref(), root)?;
            publish::run(root, &config, &key, date, title, &summary, &copies)
        }

        Commands::Feed { locale, format } => {
            let config = load_config(cli.config.as_deref(), root)?;
            feed::run(root, &config, parse_locale(&locale)?, format.parse()?)
        }

        Commands::Calc {
            principal,
            monthly,
            yield_pct,
            growth,
            years,
            tax_rate,
            format,
        } => {
            let config = load_config(cli.config.as_deref(), root)?;
            let inputs = crate::calculator::GrowthInputs {
                principal,
                monthly_deposit: monthly,
                dividend_yield_pct: yield_pct,
                growth_pct: growth,
                years,
                tax_rate: tax_rate.unwrap_or(config.calculator.tax_rate),
            };
            calc::run(&inputs, format.parse::<OutputFormat>()?)
        }
    }
}

fn load_config(explicit: Option<&Path>, root: &Path) -> Result<ProjectConfig> {
    config::load_config(explicit, root)
}

fn parse_locale(s: &str) -> Result<Locale> {
    s.parse().map_err(|e: String| anyhow!(e))
}
