//! Publish command - fan one item out to every locale feed

use crate::config::ProjectConfig;
use crate::feed::{LocalizedCopy, PartitionOutcome};
use crate::models::Locale;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use console::style;
use std::collections::HashMap;
use std::path::Path;

/// Parse `LOCALE=TITLE[|SUMMARY]`
fn parse_copy(raw: &str) -> Result<(Locale, LocalizedCopy)> {
    let (locale, rest) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("--copy expects LOCALE=TITLE[|SUMMARY], got '{}'", raw))?;
    let locale: Locale = locale.parse().map_err(|e: String| anyhow!(e))?;
    let (title, summary) = rest.split_once('|').unwrap_or((rest, ""));
    if title.trim().is_empty() {
        anyhow::bail!("--copy for '{}' has an empty title", locale);
    }
    Ok((locale, LocalizedCopy::new(title.trim(), summary.trim())))
}

/// Per-locale copy: `--title` for every partition, `--copy` overrides
fn build_copies(
    config: &ProjectConfig,
    title: Option<String>,
    summary: &str,
    raw_copies: &[String],
) -> Result<HashMap<Locale, LocalizedCopy>> {
    let mut copies = HashMap::new();
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        for partition in &config.feed.partitions {
            copies.insert(partition.locale, LocalizedCopy::new(title.trim(), summary));
        }
    }
    for raw in raw_copies {
        let (locale, copy) = parse_copy(raw)?;
        copies.insert(locale, copy);
    }
    if copies.is_empty() {
        anyhow::bail!("Nothing to publish: pass --title or at least one --copy");
    }
    Ok(copies)
}

pub fn run(
    root: &Path,
    config: &ProjectConfig,
    key: &str,
    date: Option<String>,
    title: Option<String>,
    summary: &str,
    raw_copies: &[String],
) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Publication key must not be empty");
    }
    let date = match date {
        Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .map_err(|e| anyhow!("Invalid date '{}': {} (expected YYYY-MM-DD)", d, e))?,
        None => chrono::Local::now().date_naive(),
    }
    .format("%Y-%m-%d")
    .to_string();

    let copies = build_copies(config, title, summary, raw_copies)?;
    let partitions = config.feed.partition_set(root);
    let outcomes = partitions.publish(key, &date, &copies);

    let mut failed = 0;
    for (locale, outcome) in &outcomes {
        match outcome {
            PartitionOutcome::Published { len, replaced } => println!(
                "{} {}  {} records{}",
                style("✓").green(),
                style(locale).cyan(),
                len,
                if *replaced { " (replaced)" } else { "" }
            ),
            PartitionOutcome::Recovered { len, reason } => println!(
                "{} {}  {} records, previous feed was corrupt: {}",
                style("!").yellow(),
                style(locale).cyan(),
                len,
                reason
            ),
            PartitionOutcome::Skipped => {
                println!("{} {}  skipped (no copy)", style("-").dim(), style(locale).cyan())
            }
            PartitionOutcome::Failed(e) => {
                failed += 1;
                println!("{} {}  {}", style("✗").red(), style(locale).cyan(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} feeds failed to update", failed, outcomes.len());
    }
    Ok(())
}
