//! Markdown reporter
//!
//! Tables sized for a blog post or a README.

use crate::calculator::GrowthProjection;
use crate::insights::InsightsReport;
use crate::models::{Locale, PublicationRecord};

pub fn render_insights(report: &InsightsReport, locale: Locale, top: usize) -> String {
    let mut md = String::new();
    md.push_str("# Dividend Insights\n\n");
    md.push_str(&format!(
        "Generated: {} | Stocks: {}\n\n",
        report.generated_at, report.total_stocks
    ));

    if report.stocks.is_empty() {
        md.push_str("_No dividend payers in this run._\n");
        return md;
    }

    md.push_str("| Ticker | Name | Sector | Yield | Payout | 5Y Avg | Grade |\n");
    md.push_str("|--------|------|--------|------:|-------:|-------:|-------|\n");
    for stock in report.stocks.iter().take(top) {
        md.push_str(&format!(
            "| {} | {} | {} | {:.2}% | {:.1}% | {:.2}% | {} |\n",
            stock.ticker,
            escape(&stock.name),
            escape(&stock.sector),
            stock.dividend_yield,
            stock.payout_ratio,
            stock.five_year_avg_yield,
            stock.grade.label(locale)
        ));
    }
    md
}

pub fn render_feed(records: &[PublicationRecord]) -> String {
    let mut md = String::new();
    for record in records {
        md.push_str(&format!(
            "- {} [{}]({})",
            record.date,
            escape(&record.title),
            record.key
        ));
        if !record.summary.is_empty() {
            md.push_str(&format!(": {}", record.summary));
        }
        md.push('\n');
    }
    md
}

pub fn render_projection(p: &GrowthProjection) -> String {
    let mut md = String::from("| Year | Principal | Capital gains | Dividends | Total |\n");
    md.push_str("|-----:|----------:|--------------:|----------:|------:|\n");
    for y in &p.years {
        md.push_str(&format!(
            "| {} | ${:.0} | ${:.0} | ${:.0} | ${:.0} |\n",
            y.year, y.principal, y.capital_gains, y.dividends, y.total
        ));
    }
    md.push_str(&format!("\n**ROI: {:.1}%**\n", p.roi_pct));
    md
}

/// Table cells cannot contain a bare pipe
fn escape(s: &str) -> String {
    s.replace('|', "\\|")
}
