//! divgrade - dividend quality grading and publication feeds
//!
//! Grades securities into S/A/B/C tiers from yield, payout ratio and yield
//! stability, builds the yield-sorted insights report for a ticker universe,
//! and maintains bounded per-locale publication feeds on disk.

pub mod calculator;
pub mod cli;
pub mod collector;
pub mod config;
pub mod feed;
pub mod insights;
pub mod models;
pub mod reporters;
pub mod scoring;
