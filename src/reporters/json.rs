//! JSON reporter
//!
//! Pretty-printed JSON for piping to jq or feeding the site build.

use super::GradeView;
use anyhow::Result;
use serde::Serialize;

pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Grade output carries the inputs next to the breakdown
pub fn render_grade(view: &GradeView<'_>) -> Result<String> {
    #[derive(Serialize)]
    struct Graded<'a> {
        grade: crate::models::Grade,
        label: &'static str,
        metrics: &'a crate::models::SecurityMetrics,
        breakdown: &'a crate::scoring::ScoreBreakdown,
    }

    render(&Graded {
        grade: view.breakdown.grade,
        label: view.breakdown.grade.label(view.locale),
        metrics: view.metrics,
        breakdown: view.breakdown,
    })
}
