//! Publication feeds
//!
//! A feed is a bounded, newest-first list of [`PublicationRecord`]s with
//! unique keys, persisted as a JSON array (`title`, `date`, `link`,
//! `summary`). Every update is a full read-merge-write cycle:
//!
//! 1. Acquire the feed's lease file, breaking it if its owner is long gone
//! 2. Load the current records (missing or corrupt storage reads as empty)
//! 3. [`merge`] the incoming record
//! 4. Write the first `cap` records to a temp file and rename it over the feed
//!
//! Ordering is by insertion, not by the record's `date`.

mod lease;
mod partition;

pub use lease::{Lease, DEFAULT_LEASE_STALE_AFTER, DEFAULT_LEASE_TIMEOUT};
pub use partition::{LocalizedCopy, Partition, PartitionOutcome, PartitionSet};

use crate::models::PublicationRecord;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of records a feed keeps
pub const DEFAULT_CAP: usize = 20;

/// Errors that can occur while writing a feed
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to write feed {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize feed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Timed out after {waited:?} waiting for lease {path}")]
    LeaseTimeout { path: PathBuf, waited: Duration },

    #[error("Failed to acquire lease {path}: {source}")]
    Lease {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Fold one record into a feed.
///
/// Any existing record with the same key is dropped, the incoming record
/// becomes the head, and the result is cut to `cap` entries. Duplicate keys
/// already present in `existing` collapse to their first (newest) entry.
pub fn merge(
    existing: Vec<PublicationRecord>,
    incoming: PublicationRecord,
    cap: usize,
) -> Vec<PublicationRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len() + 1);
    seen.insert(incoming.key.clone());

    let mut merged = Vec::with_capacity(cap.min(existing.len() + 1));
    merged.push(incoming);
    merged.extend(existing.into_iter().filter(|r| seen.insert(r.key.clone())));
    merged.truncate(cap);
    merged
}

/// What was found in feed storage
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No feed file yet
    Missing,
    /// Parsed records, newest first
    Loaded(Vec<PublicationRecord>),
    /// The file exists but could not be read
    Unreadable(String),
    /// The file was read but is not a valid record list
    Malformed(String),
}

impl LoadOutcome {
    /// Records to merge into. Anything other than `Loaded` starts empty.
    pub fn into_records(self) -> Vec<PublicationRecord> {
        match self {
            LoadOutcome::Loaded(records) => records,
            _ => Vec::new(),
        }
    }

    /// Why prior storage was discarded, if it was
    pub fn recovery_reason(&self) -> Option<&str> {
        match self {
            LoadOutcome::Unreadable(reason) | LoadOutcome::Malformed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Parse feed content
pub fn parse_records(content: &str) -> LoadOutcome {
    match serde_json::from_str::<Vec<PublicationRecord>>(content) {
        Ok(records) => LoadOutcome::Loaded(records),
        Err(e) => LoadOutcome::Malformed(e.to_string()),
    }
}

/// Result of one read-merge-write cycle
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    /// Records in the feed after the update
    pub len: usize,
    /// Whether a record with the same key was replaced
    pub replaced: bool,
    /// Records that fell off the end
    pub dropped: usize,
    /// Set when prior storage was unreadable or malformed and was discarded
    pub recovered: Option<String>,
}

/// One persisted feed
#[derive(Debug, Clone)]
pub struct PublicationIndex {
    path: PathBuf,
    cap: usize,
    lease_timeout: Duration,
    lease_stale_after: Duration,
}

impl PublicationIndex {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap,
            lease_timeout: DEFAULT_LEASE_TIMEOUT,
            lease_stale_after: DEFAULT_LEASE_STALE_AFTER,
        }
    }

    pub fn with_lease_timeout(mut self, timeout: Duration) -> Self {
        self.lease_timeout = timeout;
        self
    }

    /// Age at which another writer's lease is considered abandoned
    pub fn with_lease_stale_after(mut self, stale_after: Duration) -> Self {
        self.lease_stale_after = stale_after;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Lease file guarding this feed
    pub fn lease_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "feed".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Read the feed from disk
    pub fn load(&self) -> LoadOutcome {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No feed at {}", self.path.display());
                return LoadOutcome::Missing;
            }
            Err(e) => {
                warn!("Feed {} is unreadable: {}", self.path.display(), e);
                return LoadOutcome::Unreadable(e.to_string());
            }
        };

        let outcome = parse_records(&content);
        match &outcome {
            LoadOutcome::Loaded(records) => {
                debug!("Loaded {} records from {}", records.len(), self.path.display())
            }
            LoadOutcome::Malformed(reason) => {
                warn!("Feed {} is malformed, starting empty: {}", self.path.display(), reason)
            }
            _ => {}
        }
        outcome
    }

    /// Current records, empty if storage is missing or corrupt
    pub fn records(&self) -> Vec<PublicationRecord> {
        self.load().into_records()
    }

    /// Overwrite the feed with the first `cap` records.
    ///
    /// Writes to a sibling temp file and renames it into place.
    pub fn save(&self, records: &[PublicationRecord]) -> IndexResult<()> {
        let kept = &records[..records.len().min(self.cap)];
        let json = serde_json::to_string_pretty(kept)?;
        write_atomic(&self.path, json.as_bytes()).map_err(|source| IndexError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved {} records to {}", kept.len(), self.path.display());
        Ok(())
    }

    /// Merge one record into the feed under its lease
    pub fn update(&self, incoming: PublicationRecord) -> IndexResult<UpdateReport> {
        let _lease = Lease::acquire(&self.lease_path(), self.lease_timeout, self.lease_stale_after)?;

        let outcome = self.load();
        let recovered = outcome.recovery_reason().map(str::to_string);
        let existing = outcome.into_records();

        let replaced = existing.iter().any(|r| r.key == incoming.key);
        let others: HashSet<&str> = existing
            .iter()
            .filter(|r| r.key != incoming.key)
            .map(|r| r.key.as_str())
            .collect();
        let before = others.len();
        let key = incoming.key.clone();

        let merged = merge(existing, incoming, self.cap);
        self.save(&merged)?;

        let dropped = (before + 1).saturating_sub(merged.len());
        info!(
            "Indexed {} into {} ({} records, replaced={}, dropped={})",
            key,
            self.path.display(),
            merged.len(),
            replaced,
            dropped
        );

        Ok(UpdateReport {
            len: merged.len(),
            replaced,
            dropped,
            recovered,
        })
    }
}

/// Write bytes to a temp file next to `path`, then rename over it.
///
/// The temp file is removed if any step fails, and the parent directory is
/// synced after the rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("feed"),
        std::process::id()
    ));
    let written = std::fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        })
        .and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
        }
        return Err(e);
    }

    if let Ok(dir) = std::fs::File::open(&parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(key: &str, title: &str, date: &str) -> PublicationRecord {
        PublicationRecord::new(key, title, date, format!("{} summary", title))
    }

    fn keys(records: &[PublicationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn test_replace_on_conflict() {
        let existing = vec![record("a", "old", "2026-01-01")];
        let merged = merge(existing, record("a", "new", "2026-01-01"), 10);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "new");
    }

    #[test]
    fn test_recency_ordering_ignores_date() {
        let first = merge(vec![], record("r1", "later date", "2026-03-01"), 10);
        let second = merge(first, record("r2", "earlier date", "2025-01-01"), 10);

        assert_eq!(keys(&second), vec!["r2", "r1"]);
    }

    #[test]
    fn test_conflict_moves_record_to_head() {
        let existing = vec![
            record("c", "c", "2026-01-03"),
            record("b", "b", "2026-01-02"),
            record("a", "a", "2026-01-01"),
        ];
        let merged = merge(existing, record("a", "a2", "2026-01-04"), 10);
        assert_eq!(keys(&merged), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut feed = Vec::new();
        for i in 0..15 {
            feed = merge(feed, record(&format!("k{}", i), "t", "2026-01-01"), 10);
            assert!(feed.len() <= 10);
        }
        assert_eq!(feed.len(), 10);
        assert_eq!(feed[0].key, "k14");
        assert_eq!(feed[9].key, "k5");
    }

    #[test]
    fn test_zero_cap_keeps_nothing() {
        let merged = merge(vec![record("a", "a", "2026-01-01")], record("b", "b", "2026-01-02"), 0);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_keys_stay_unique() {
        let existing = vec![
            record("x", "x1", "2026-01-01"),
            record("y", "y", "2026-01-01"),
            record("x", "x2", "2026-01-01"),
        ];
        let merged = merge(existing, record("z", "z", "2026-01-02"), 10);

        let unique: HashSet<&str> = merged.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(unique.len(), merged.len());
        assert_eq!(keys(&merged), vec!["z", "x", "y"]);
        assert_eq!(merged[1].title, "x1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_records("{not json"), LoadOutcome::Malformed(_)));
        assert!(matches!(parse_records("{\"title\": \"x\"}"), LoadOutcome::Malformed(_)));
        assert_eq!(parse_records("[]"), LoadOutcome::Loaded(vec![]));
    }

    #[test]
    fn test_missing_feed_loads_empty() {
        let dir = TempDir::new().unwrap();
        let index = PublicationIndex::new(dir.path().join("posts.json"), 10);
        assert_eq!(index.load(), LoadOutcome::Missing);
        assert!(index.records().is_empty());
    }

    #[test]
    fn test_corrupt_feed_recovers_on_update() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        std::fs::write(&path, "[{\"title\": \"half written").unwrap();

        let index = PublicationIndex::new(&path, 10);
        assert!(matches!(index.load(), LoadOutcome::Malformed(_)));

        let report = index.update(record("blog/a.html", "A", "2026-02-01")).unwrap();
        assert_eq!(report.len, 1);
        assert!(report.recovered.is_some());

        let records = index.records();
        assert_eq!(keys(&records), vec!["blog/a.html"]);
    }

    #[test]
    fn test_update_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("posts.json");
        let index = PublicationIndex::new(&path, 3);

        for i in 0..5 {
            index
                .update(record(&format!("blog/{}.html", i), "t", "2026-01-01"))
                .unwrap();
        }
        let report = index.update(record("blog/3.html", "again", "2026-01-09")).unwrap();
        assert!(report.replaced);
        assert_eq!(report.dropped, 0);

        let records = index.records();
        assert_eq!(keys(&records), vec!["blog/3.html", "blog/4.html", "blog/2.html"]);

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["link"], "blog/3.html");
        assert_eq!(raw[0]["title"], "again");

        // Lease and temp files are cleaned up
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(leftovers, vec!["posts.json".to_string()]);
    }

    #[test]
    fn test_update_reports_dropped_records() {
        let dir = TempDir::new().unwrap();
        let index = PublicationIndex::new(dir.path().join("posts.json"), 2);

        index.update(record("a", "a", "2026-01-01")).unwrap();
        index.update(record("b", "b", "2026-01-01")).unwrap();
        let report = index.update(record("c", "c", "2026-01-01")).unwrap();

        assert_eq!(report.len, 2);
        assert_eq!(report.dropped, 1);
        assert!(!report.replaced);
    }

    #[test]
    fn test_save_truncates_to_cap() {
        let dir = TempDir::new().unwrap();
        let index = PublicationIndex::new(dir.path().join("posts.json"), 2);
        let records: Vec<_> = (0..4).map(|i| record(&i.to_string(), "t", "2026-01-01")).collect();

        index.save(&records).unwrap();
        assert_eq!(index.records().len(), 2);
    }

    #[test]
    fn test_lease_path_sits_next_to_feed() {
        let index = PublicationIndex::new("/srv/site/ko/posts.json", 10);
        assert_eq!(index.lease_path(), PathBuf::from("/srv/site/ko/posts.json.lock"));
    }

    #[test]
    fn test_record_missing_optional_fields_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        std::fs::write(
            &path,
            r#"[
  {"title": "A", "date": "2026-01-02", "link": "blog/a.html", "summary": "s"},
  {"title": "B", "link": "blog/b.html"}
]"#,
        )
        .unwrap();

        let index = PublicationIndex::new(&path, 10);
        let report = index.update(record("blog/c.html", "C", "2026-01-03")).unwrap();
        assert_eq!(report.recovered, None);
        assert_eq!(report.len, 3);

        let records = index.records();
        assert_eq!(keys(&records), vec!["blog/c.html", "blog/a.html", "blog/b.html"]);
        assert_eq!(records[2].date, "");
    }

    #[test]
    fn test_record_without_link_is_malformed() {
        assert!(matches!(
            parse_records(r#"[{"title": "no key", "date": "2026-01-01"}]"#),
            LoadOutcome::Malformed(_)
        ));
    }

    #[test]
    fn test_unknown_record_fields_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        std::fs::write(
            &path,
            r#"[{"title": "A", "date": "2026-01-02", "link": "blog/a.html", "image": "img/a.png"}]"#,
        )
        .unwrap();

        let index = PublicationIndex::new(&path, 10);
        index.update(record("blog/b.html", "B", "2026-01-03")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[1]["image"], "img/a.png");
        assert!(raw[0].get("image").is_none());
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file
        let target = dir.path().join("posts.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        assert!(write_atomic(&target, b"[]").is_err());
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["posts.json".to_string()]);
    }
}
