//! Per-locale feeds
//!
//! Each locale keeps its own feed file and cap. Publishing one item fans out
//! into an independent update per partition; a failure in one partition does
//! not stop the others, so the key sets of different partitions can drift.

use super::{IndexError, PublicationIndex};
use crate::models::{Locale, PublicationRecord};
use std::collections::HashMap;
use tracing::{info, warn};

/// Locale-specific title and summary for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedCopy {
    pub title: String,
    pub summary: String,
}

impl LocalizedCopy {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// One locale's feed
#[derive(Debug, Clone)]
pub struct Partition {
    pub locale: Locale,
    pub index: PublicationIndex,
}

/// What happened to one partition during a publish
#[derive(Debug)]
pub enum PartitionOutcome {
    Published { len: usize, replaced: bool },
    /// Prior storage was corrupt and replaced by a fresh feed
    Recovered { len: usize, reason: String },
    /// No copy was supplied for this locale
    Skipped,
    Failed(IndexError),
}

impl PartitionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PartitionOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PartitionSet {
    partitions: Vec<Partition>,
}

impl PartitionSet {
    pub fn new(partitions: Vec<Partition>) -> Self {
        Self { partitions }
    }

    pub fn get(&self, locale: Locale) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.locale == locale)
    }

    /// Publish one item to every partition that has a copy for its locale
    pub fn publish(
        &self,
        key: &str,
        date: &str,
        copies: &HashMap<Locale, LocalizedCopy>,
    ) -> Vec<(Locale, PartitionOutcome)> {
        self.partitions
            .iter()
            .map(|partition| {
                let Some(copy) = copies.get(&partition.locale) else {
                    return (partition.locale, PartitionOutcome::Skipped);
                };
                let record = PublicationRecord::new(key, &copy.title, date, &copy.summary);
                let outcome = match partition.index.update(record) {
                    Ok(report) => match report.recovered {
                        Some(reason) => PartitionOutcome::Recovered {
                            len: report.len,
                            reason,
                        },
                        None => PartitionOutcome::Published {
                            len: report.len,
                            replaced: report.replaced,
                        },
                    },
                    Err(e) => {
                        warn!("Publishing {} to {} feed failed: {}", key, partition.locale, e);
                        PartitionOutcome::Failed(e)
                    }
                };
                (partition.locale, outcome)
            })
            .inspect(|(locale, outcome)| {
                if !outcome.is_failure() {
                    info!("{} feed: {:?}", locale, outcome);
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn set_in(dir: &TempDir) -> PartitionSet {
        PartitionSet::new(
            Locale::all()
                .into_iter()
                .map(|locale| Partition {
                    locale,
                    index: PublicationIndex::new(
                        dir.path().join(locale.code()).join("posts.json"),
                        10,
                    )
                    .with_lease_timeout(Duration::from_millis(60)),
                })
                .collect(),
        )
    }

    #[test]
    fn test_fan_out_uses_partition_copy() {
        let dir = TempDir::new().unwrap();
        let set = set_in(&dir);
        let mut copies = HashMap::new();
        copies.insert(Locale::En, LocalizedCopy::new("SCHD deep dive", "Quality dividend ETF"));
        copies.insert(Locale::Ko, LocalizedCopy::new("SCHD 분석", "배당 ETF"));

        let outcomes = set.publish("blog/2026-01-05-SCHD.html", "2026-01-05", &copies);
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0].1, PartitionOutcome::Published { len: 1, .. }));
        assert!(matches!(outcomes[1].1, PartitionOutcome::Published { len: 1, .. }));
        assert!(matches!(outcomes[2].1, PartitionOutcome::Skipped));

        let ko = set.get(Locale::Ko).unwrap().index.records();
        assert_eq!(ko[0].title, "SCHD 분석");
        assert!(set.get(Locale::Pt).unwrap().index.records().is_empty());
    }

    #[test]
    fn test_one_failing_partition_does_not_block_others() {
        let dir = TempDir::new().unwrap();
        let set = set_in(&dir);
        let en = set.get(Locale::En).unwrap();
        std::fs::create_dir_all(en.index.path().parent().unwrap()).unwrap();
        std::fs::write(en.index.lease_path(), "").unwrap();

        let copies: HashMap<_, _> = Locale::all()
            .into_iter()
            .map(|l| (l, LocalizedCopy::new(format!("title {}", l), "s")))
            .collect();
        let outcomes = set.publish("blog/x.html", "2026-01-05", &copies);

        assert!(outcomes[0].1.is_failure());
        assert!(!outcomes[1].1.is_failure());
        assert!(!outcomes[2].1.is_failure());
        assert!(set.get(Locale::En).unwrap().index.records().is_empty());
        assert_eq!(set.get(Locale::Pt).unwrap().index.records().len(), 1);
    }

    #[test]
    fn test_corrupt_partition_reports_recovery() {
        let dir = TempDir::new().unwrap();
        let set = set_in(&dir);
        let pt = set.get(Locale::Pt).unwrap();
        std::fs::create_dir_all(pt.index.path().parent().unwrap()).unwrap();
        std::fs::write(pt.index.path(), "not json").unwrap();

        let mut copies = HashMap::new();
        copies.insert(Locale::Pt, LocalizedCopy::new("Análise", "Resumo"));
        let outcomes = set.publish("blog/y.html", "2026-01-06", &copies);

        assert!(matches!(outcomes[2].1, PartitionOutcome::Recovered { len: 1, .. }));
    }
}
