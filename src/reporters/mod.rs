//! Output reporters for divgrade results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown, ready to paste into a post

mod json;
mod markdown;
mod text;

use crate::calculator::{GrowthInputs, GrowthProjection};
use crate::insights::InsightsReport;
use crate::models::{Locale, PublicationRecord, SecurityMetrics};
use crate::scoring::ScoreBreakdown;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// A single security's grade with the inputs that produced it
pub struct GradeView<'a> {
    pub metrics: &'a SecurityMetrics,
    pub breakdown: &'a ScoreBreakdown,
    pub locale: Locale,
    pub explain: bool,
}

pub fn render_grade(view: &GradeView<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_grade(view)),
        OutputFormat::Json => json::render_grade(view),
        OutputFormat::Markdown => Ok(view.breakdown.explain(view.metrics)),
    }
}

/// Render the insights report, listing at most `top` rows outside JSON
pub fn render_insights(
    report: &InsightsReport,
    format: OutputFormat,
    locale: Locale,
    top: usize,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_insights(report, locale, top)),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => Ok(markdown::render_insights(report, locale, top)),
    }
}

pub fn render_feed(records: &[PublicationRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_feed(records)),
        OutputFormat::Json => json::render(&records),
        OutputFormat::Markdown => Ok(markdown::render_feed(records)),
    }
}

pub fn render_projection(
    inputs: &GrowthInputs,
    projection: &GrowthProjection,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_projection(inputs, projection)),
        OutputFormat::Json => json::render(projection),
        OutputFormat::Markdown => Ok(markdown::render_projection(projection)),
    }
}

/// Truncate to `max` characters, marking the cut with "..."
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
