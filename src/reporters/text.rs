//! Text (terminal) reporter with colors and formatting

use super::{truncate, GradeView};
use crate::calculator::{GrowthInputs, GrowthProjection};
use crate::insights::InsightsReport;
use crate::models::{Grade, Locale, PublicationRecord};

/// Grade colors (ANSI escape codes)
fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::S => "\x1b[35m", // Magenta
        Grade::A => "\x1b[32m", // Green
        Grade::B => "\x1b[33m", // Yellow
        Grade::C => "\x1b[90m", // Gray
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

pub fn render_grade(view: &GradeView<'_>) -> String {
    let b = view.breakdown;
    let c = grade_color(b.grade);
    let mut out = format!(
        "{c}{BOLD}{}{RESET}  {DIM}({} pts){RESET}\n",
        b.grade.label(view.locale),
        b.total
    );
    if view.explain {
        out.push('\n');
        out.push_str(&b.explain(view.metrics));
        out.push('\n');
    }
    out
}

pub fn render_insights(report: &InsightsReport, locale: Locale, top: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}Dividend Insights{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Stocks: {BOLD}{}{RESET}  Generated: {}\n",
        report.total_stocks, report.generated_at
    ));

    let counts: Vec<String> = report
        .grade_counts()
        .into_iter()
        .map(|(g, n)| format!("{}{} {}{RESET}", grade_color(g.0), n, g.0.label(locale)))
        .collect();
    if !counts.is_empty() {
        out.push_str(&format!("  {}\n", counts.join(" | ")));
    }
    out.push('\n');

    if report.stocks.is_empty() {
        out.push_str(&format!("{DIM}No dividend payers in this run.{RESET}\n"));
        return out;
    }

    out.push_str(&format!(
        "{DIM}  #   TICKER  NAME                          YIELD   PAYOUT  GRADE{RESET}\n"
    ));
    out.push_str(&format!(
        "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
    ));
    for (i, stock) in report.stocks.iter().take(top).enumerate() {
        let c = grade_color(stock.grade);
        out.push_str(&format!(
            "  {DIM}{:>3}{RESET}  {:<6}  {:<28}  {:>5.2}%  {:>5.1}%  {c}{}{RESET}\n",
            i + 1,
            stock.ticker,
            truncate(&stock.name, 28),
            stock.dividend_yield,
            stock.payout_ratio,
            stock.grade.label(locale)
        ));
    }

    let remaining = report.stocks.len().saturating_sub(top);
    if remaining > 0 {
        out.push_str(&format!("\n  {DIM}...and {} more{RESET}\n", remaining));
    }
    out
}

pub fn render_feed(records: &[PublicationRecord]) -> String {
    if records.is_empty() {
        return format!("{DIM}Feed is empty.{RESET}\n");
    }
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "  {DIM}{:>2}{RESET}  {}  {BOLD}{}{RESET}\n      {DIM}{}{RESET}\n",
            i + 1,
            record.date,
            truncate(&record.title, 60),
            record.key
        ));
    }
    out
}

pub fn render_projection(inputs: &GrowthInputs, p: &GrowthProjection) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{BOLD}Growth projection{RESET} {DIM}({} years, {:.2}% yield, {:.2}% growth, {:.0}% tax){RESET}\n\n",
        inputs.years,
        inputs.dividend_yield_pct,
        inputs.growth_pct,
        inputs.tax_rate * 100.0
    ));
    out.push_str(&format!(
        "{DIM}  YEAR      PRINCIPAL   CAPITAL GAINS       DIVIDENDS           TOTAL{RESET}\n"
    ));
    for y in &p.years {
        out.push_str(&format!(
            "  {:>4}  {:>13.0}  {:>14.0}  {:>14.0}  {:>14.0}\n",
            y.year, y.principal, y.capital_gains, y.dividends, y.total
        ));
    }
    out.push_str(&format!(
        "\nFinal: {BOLD}${:.0}{RESET}  Dividends: ${:.0}  ROI: {BOLD}{:.1}%{RESET}\n",
        p.final_total, p.total_dividends, p.roi_pct
    ));
    out
}
