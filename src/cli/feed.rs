//! Feed command - list one locale's records

use crate::config::ProjectConfig;
use crate::models::Locale;
use crate::reporters::{self, OutputFormat};
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn run(root: &Path, config: &ProjectConfig, locale: Locale, format: OutputFormat) -> Result<()> {
    let partitions = config.feed.partition_set(root);
    let Some(partition) = partitions.get(locale) else {
        anyhow::bail!("No feed configured for locale '{}'", locale);
    };

    let outcome = partition.index.load();
    if let Some(reason) = outcome.recovery_reason() {
        eprintln!(
            "{} {} is corrupt and will be replaced on the next publish: {}",
            style("!").yellow(),
            partition.index.path().display(),
            reason
        );
    }

    let records = outcome.into_records();
    print!("{}", reporters::render_feed(&records, format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
