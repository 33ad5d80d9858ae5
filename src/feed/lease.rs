//! Exclusive lease files
//!
//! A lease is a lock file created with `create_new`. Whoever creates it owns
//! the feed until the lease is dropped, which removes the file. The file
//! records the owner's pid and acquisition time; a lease older than the
//! staleness bound belongs to a writer that died without cleaning up and is
//! broken so the feed can be written again.

use super::IndexError;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

pub const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(5);
/// Age after which a lease is assumed abandoned
pub const DEFAULT_LEASE_STALE_AFTER: Duration = Duration::from_secs(60);
const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Held lease on a feed. Released on drop.
#[derive(Debug)]
pub struct Lease {
    path: PathBuf,
    file: std::fs::File,
}

impl Lease {
    /// Acquire the lease, retrying until `timeout` elapses.
    ///
    /// A lease held for longer than `stale_after` is removed and retried.
    pub fn acquire(
        lock_path: &Path,
        timeout: Duration,
        stale_after: Duration,
    ) -> Result<Lease, IndexError> {
        let started = Instant::now();
        let lease_err = |source: std::io::Error| IndexError::Lease {
            path: lock_path.to_path_buf(),
            source,
        };
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(lease_err)?;
        }
        loop {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(lock_path)
            {
                Ok(file) => {
                    let lease = Lease {
                        path: lock_path.to_path_buf(),
                        file,
                    };
                    // Dropping on error removes the half-written lease
                    lease.stamp().map_err(lease_err)?;
                    debug!("Acquired lease {}", lock_path.display());
                    return Ok(lease);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if let Some(age) = lease_age(lock_path).filter(|age| *age >= stale_after) {
                        warn!(
                            "Breaking stale lease {} (held for {:?}): {}",
                            lock_path.display(),
                            age,
                            read_owner(lock_path)
                        );
                        match std::fs::remove_file(lock_path) {
                            Ok(()) => continue,
                            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                            Err(source) => return Err(lease_err(source)),
                        }
                    }
                    let waited = started.elapsed();
                    if waited >= timeout {
                        return Err(IndexError::LeaseTimeout {
                            path: lock_path.to_path_buf(),
                            waited,
                        });
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(source) => return Err(lease_err(source)),
            }
        }
    }

    /// Record the owner so a later writer can judge staleness
    fn stamp(&self) -> std::io::Result<()> {
        let mut file = &self.file;
        write!(
            file,
            "pid={}\nacquired={}\n",
            std::process::id(),
            Utc::now().to_rfc3339()
        )?;
        file.sync_all()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to release lease {}: {}", self.path.display(), e);
        }
    }
}

fn read_owner(lock_path: &Path) -> String {
    std::fs::read_to_string(lock_path)
        .ok()
        .and_then(|c| c.lines().find_map(|l| l.strip_prefix("pid=").map(str::to_string)))
        .map(|pid| format!("pid {}", pid))
        .unwrap_or_else(|| "unknown owner".to_string())
}

/// How long the lease has been held.
///
/// Uses the recorded acquisition time, falling back to the file's mtime for
/// a lease whose owner died before stamping it. `None` if the lease vanished.
fn lease_age(lock_path: &Path) -> Option<Duration> {
    let content = std::fs::read_to_string(lock_path).ok()?;
    let acquired = content
        .lines()
        .find_map(|l| l.strip_prefix("acquired="))
        .and_then(|ts| DateTime::parse_from_rfc3339(ts.trim()).ok());
    match acquired {
        Some(at) => Some(
            (Utc::now() - at.with_timezone(&Utc))
                .to_std()
                .unwrap_or(Duration::ZERO),
        ),
        None => {
            let modified = std::fs::metadata(lock_path).ok()?.modified().ok()?;
            Some(
                SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO),
            )
        }
    }
}
