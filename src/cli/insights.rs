//! Insights command - grade the ticker universe and write the report

use crate::collector;
use crate::config::ProjectConfig;
use crate::insights;
use crate::models::Locale;
use crate::reporters::{self, OutputFormat};
use anyhow::Result;
use console::style;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run(
    root: &Path,
    config: &ProjectConfig,
    quotes_path: &Path,
    output: Option<&Path>,
    all: bool,
    min_yield: Option<f64>,
    top: Option<usize>,
    format: OutputFormat,
    locale: Locale,
) -> Result<()> {
    let quotes = collector::load_quotes(quotes_path)?;
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let outcomes = insights::collect(&config.universe, &quotes, all, &now);
    let min_yield = min_yield.unwrap_or(config.insights.min_yield);
    let (report, summary) = insights::build(outcomes, min_yield, &now);

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => root.join(&config.insights.output),
    };
    report.save(&output_path)?;

    let top = top.unwrap_or(config.insights.top);
    print!(
        "{}",
        reporters::render_insights(&report, format, locale, top)?
    );
    if format == OutputFormat::Json {
        println!();
    }

    eprintln!(
        "{} Wrote {} stocks to {}",
        style("✓").green(),
        report.total_stocks,
        style(output_path.display()).cyan()
    );
    if !summary.no_data.is_empty() {
        eprintln!(
            "  {} without dividend data: {}",
            summary.no_data.len(),
            style(summary.no_data.join(", ")).dim()
        );
    }
    for error in &summary.corrupt {
        eprintln!("  {} {}", style("✗").red(), error);
    }

    Ok(())
}
