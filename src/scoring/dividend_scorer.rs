//! Dividend quality scorer
//!
//! Pure functions from [`SecurityMetrics`] to points and a [`Grade`].
//! Threshold tables are ordered best bucket first; the first matching
//! bucket wins.

use crate::models::{Grade, SecurityMetrics};
use serde::Serialize;
use tracing::debug;

/// Yield tiers: (minimum yield %, points)
const YIELD_TIERS: &[(f64, u32)] = &[(5.0, 40), (4.0, 35), (3.0, 25), (2.0, 15), (1.0, 5)];

/// Payout tiers for ordinary corporations: (inclusive upper bound %, points)
const STANDARD_PAYOUT_TIERS: &[(f64, u32)] = &[(50.0, 30), (70.0, 20), (90.0, 10)];

/// Payout tiers for REITs: (inclusive upper bound %, points)
const REIT_PAYOUT_TIERS: &[(f64, u32)] = &[(95.0, 30), (105.0, 20), (120.0, 10)];

/// Consistency tiers: (max relative deviation from the 5-year average, points)
const CONSISTENCY_TIERS: &[(f64, u32)] = &[(0.10, 30), (0.20, 20), (0.30, 10)];

/// Yield window in which a healthy score earns the growth bonus
const GROWTH_YIELD_MIN: f64 = 2.0;
const GROWTH_YIELD_MAX: f64 = 5.0;
/// Running score required before the bonus applies
const GROWTH_SCORE_MIN: u32 = 50;
pub const GROWTH_BONUS_POINTS: u32 = 5;

pub const TIER_S_MIN: u32 = 80;
pub const TIER_A_MIN: u32 = 65;
pub const TIER_B_MIN: u32 = 50;

/// Complete score breakdown for transparency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub yield_points: u32,
    pub payout_points: u32,
    pub consistency_points: u32,
    pub growth_bonus: u32,
    /// Sum of all terms
    pub total: u32,
    pub grade: Grade,
    /// Whether the REIT payout curve was used
    pub reit: bool,
    /// Relative deviation from the 5-year average, if history exists
    pub deviation: Option<f64>,
}

/// Points for the trailing yield (max 40)
pub fn yield_points(yield_pct: f64) -> u32 {
    YIELD_TIERS
        .iter()
        .find(|(min, _)| yield_pct >= *min)
        .map(|(_, pts)| *pts)
        .unwrap_or(0)
}

/// Points for the payout ratio (max 30).
///
/// A payout of exactly 0 means the ratio is unknown and scores nothing.
pub fn payout_points(payout_ratio_pct: f64, reit: bool) -> u32 {
    if payout_ratio_pct.is_nan() || payout_ratio_pct <= 0.0 {
        return 0;
    }
    let tiers = if reit { REIT_PAYOUT_TIERS } else { STANDARD_PAYOUT_TIERS };
    tiers
        .iter()
        .find(|(max, _)| payout_ratio_pct <= *max)
        .map(|(_, pts)| *pts)
        .unwrap_or(0)
}

/// Relative deviation of the current yield from its 5-year average
fn deviation(metrics: &SecurityMetrics) -> Option<f64> {
    if !metrics.has_history() {
        return None;
    }
    let avg = metrics.five_year_avg_yield_pct;
    Some((metrics.yield_pct - avg).abs() / avg)
}

/// Points for yield stability against history (max 30)
pub fn consistency_points(metrics: &SecurityMetrics) -> u32 {
    match deviation(metrics) {
        Some(d) => CONSISTENCY_TIERS
            .iter()
            .find(|(max, _)| d <= *max)
            .map(|(_, pts)| *pts)
            .unwrap_or(0),
        None => 0,
    }
}

/// Bonus for moderate yields on an already healthy score.
///
/// `running` is the score before the bonus.
pub fn growth_bonus(yield_pct: f64, running: u32) -> u32 {
    let in_window = (GROWTH_YIELD_MIN..=GROWTH_YIELD_MAX).contains(&yield_pct);
    if in_window && running >= GROWTH_SCORE_MIN {
        GROWTH_BONUS_POINTS
    } else {
        0
    }
}

/// Map a total score to its tier
pub fn tier_for(total: u32) -> Grade {
    if total >= TIER_S_MIN {
        Grade::S
    } else if total >= TIER_A_MIN {
        Grade::A
    } else if total >= TIER_B_MIN {
        Grade::B
    } else {
        Grade::C
    }
}

/// Score a security with the full breakdown
pub fn score(metrics: &SecurityMetrics) -> ScoreBreakdown {
    let reit = metrics.is_reit();
    let yield_pts = yield_points(metrics.yield_pct);
    let payout_pts = payout_points(metrics.payout_ratio_pct, reit);
    let consistency_pts = consistency_points(metrics);

    let running = yield_pts + payout_pts + consistency_pts;
    let bonus = growth_bonus(metrics.yield_pct, running);
    let total = running + bonus;
    let grade = tier_for(total);

    debug!(
        "Dividend score: yield={} payout={} (reit={}) consistency={} bonus={} -> {} ({})",
        yield_pts, payout_pts, reit, consistency_pts, bonus, total, grade
    );

    ScoreBreakdown {
        yield_points: yield_pts,
        payout_points: payout_pts,
        consistency_points: consistency_pts,
        growth_bonus: bonus,
        total,
        grade,
        reit,
        deviation: deviation(metrics),
    }
}

/// Grade a security
pub fn grade(metrics: &SecurityMetrics) -> Grade {
    score(metrics).grade
}

impl ScoreBreakdown {
    /// Generate human-readable explanation of the score
    pub fn explain(&self, metrics: &SecurityMetrics) -> String {
        let mut lines = Vec::new();

        lines.push(format!("# Dividend Grade: {} ({} pts)\n", self.grade, self.total));

        lines.push("## Scoring Formula\n".to_string());
        lines.push("```".to_string());
        lines.push("Score = Yield (40) + Payout (30) + Consistency (30) + Growth bonus (5)".to_string());
        lines.push(format!(
            "Tiers = S >= {}, A >= {}, B >= {}, else C",
            TIER_S_MIN, TIER_A_MIN, TIER_B_MIN
        ));
        lines.push("```\n".to_string());

        lines.push(format!(
            "- **Yield**: {:.2}% → {} pts",
            metrics.yield_pct, self.yield_points
        ));
        let curve = if self.reit { "REIT curve" } else { "standard curve" };
        lines.push(format!(
            "- **Payout ratio**: {:.2}% ({}) → {} pts",
            metrics.payout_ratio_pct, curve, self.payout_points
        ));
        match self.deviation {
            Some(d) => lines.push(format!(
                "- **Consistency**: {:.1}% off the {:.2}% 5-year average → {} pts",
                d * 100.0,
                metrics.five_year_avg_yield_pct,
                self.consistency_points
            )),
            None => lines.push("- **Consistency**: no 5-year history → 0 pts".to_string()),
        }
        if self.growth_bonus > 0 {
            lines.push(format!("- **Growth bonus**: +{} pts", self.growth_bonus));
        }

        lines.join("\n")
    }
}
