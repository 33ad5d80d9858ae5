//! Grade command - score one security from flags

use crate::models::{Locale, SecurityMetrics};
use crate::reporters::{self, GradeView, OutputFormat};
use crate::scoring;
use anyhow::Result;

pub fn run(
    yield_pct: f64,
    payout: f64,
    avg_yield: f64,
    sector: &str,
    explain: bool,
    format: OutputFormat,
    locale: Locale,
) -> Result<()> {
    let metrics = SecurityMetrics::new(yield_pct, payout, avg_yield, sector);
    let breakdown = scoring::score(&metrics);

    let view = GradeView {
        metrics: &metrics,
        breakdown: &breakdown,
        locale,
        explain,
    };
    print!("{}", reporters::render_grade(&view, format)?);
    if format != OutputFormat::Text {
        println!();
    }
    Ok(())
}
