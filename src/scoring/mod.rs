//! Dividend Quality Grading
//!
//! This module classifies a security into a quality tier from four
//! dividend signals. The score is additive and every term is independent.
//!
//! # Scoring Formula
//!
//! ```text
//! Score = Yield + Payout + Consistency + GrowthBonus
//!
//!   Yield        0-40  tiered on trailing yield
//!   Payout       0-30  sector-adjusted (REITs get a looser curve)
//!   Consistency  0-30  relative deviation from the 5-year average yield
//!   GrowthBonus  0-5   moderate yield (2-5%) on an already healthy score
//! ```
//!
//! # Tiers
//!
//! - **S**: score >= 80
//! - **A**: score >= 65
//! - **B**: score >= 50
//! - **C**: everything else
//!
//! # Example
//!
//! A non-REIT yielding 5.5% with a 45% payout ratio and a 5.0% five-year
//! average:
//! - Yield 40, Payout 30
//! - Deviation |5.5 - 5.0| / 5.0 = 0.10 → Consistency 30
//! - Yield above 5% → no growth bonus
//!
//! Score = 100 → S

mod dividend_scorer;

pub use dividend_scorer::{
    consistency_points, grade, growth_bonus, payout_points, score, tier_for, yield_points,
    ScoreBreakdown, GROWTH_BONUS_POINTS, TIER_A_MIN, TIER_B_MIN, TIER_S_MIN,
};
