//! Retention sweeper
//!
//! Deletes session directories that have been idle longer than the
//! retention threshold. A directory's mtime is its liveness signal; the
//! session layer refreshes it on every request. The sweeper keeps no
//! in-memory state and takes no locks, so a request racing a sweep on a
//! long-idle session can see its directory vanish and get a not-found.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

/// Outcome of one sweep cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Session directories examined
    pub scanned: usize,
    /// Directories deleted
    pub removed: usize,
    /// Directories that were due but could not be inspected or deleted
    pub failed: usize,
}

/// Periodic deletion of idle session directories
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    base: PathBuf,
    retention: Duration,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(base: impl Into<PathBuf>, retention: Duration, interval: Duration) -> Self {
        Self {
            base: base.into(),
            retention,
            interval,
        }
    }

    /// Run one cycle as of `now`.
    ///
    /// Only immediate subdirectories of the base are considered. A failure
    /// on one directory is logged and the cycle moves on.
    pub async fn sweep(&self, now: SystemTime) -> io::Result<SweepReport> {
        self.sweep_with(now, |path| async move { remove_session_dir(&path).await })
            .await
    }

    /// One cycle with `remove` doing the deletion of each expired directory
    async fn sweep_with<F, Fut>(&self, now: SystemTime, remove: F) -> io::Result<SweepReport>
    where
        F: Fn(PathBuf) -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        let mut report = SweepReport::default();
        let mut entries = match tokio::fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(dir = %path.display(), "Failed to stat session directory: {}", e);
                    report.failed += 1;
                    continue;
                }
            };
            if !metadata.is_dir() {
                continue;
            }
            report.scanned += 1;

            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(dir = %path.display(), "No mtime for session directory: {}", e);
                    report.failed += 1;
                    continue;
                }
            };

            if !self.is_expired(modified, now) {
                continue;
            }

            match remove(path.clone()).await {
                Ok(()) => {
                    tracing::info!(dir = %path.display(), "Removed idle session directory");
                    report.removed += 1;
                }
                Err(e) => {
                    tracing::warn!(dir = %path.display(), "Failed to remove idle session directory: {}", e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Idle strictly longer than the retention threshold. An mtime in the
    /// future (clock skew) never expires.
    fn is_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
        now.duration_since(modified)
            .map(|idle| idle > self.retention)
            .unwrap_or(false)
    }

    /// Start the background loop. The first cycle runs immediately.
    pub fn start(self) -> JoinHandle<()> {
        tracing::info!(
            base = %self.base.display(),
            retention_secs = self.retention.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Starting retention sweeper"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                match self.sweep(SystemTime::now()).await {
                    Ok(report) if report.removed > 0 || report.failed > 0 => {
                        tracing::info!(
                            scanned = report.scanned,
                            removed = report.removed,
                            failed = report.failed,
                            "Retention sweep finished"
                        );
                    }
                    Ok(report) => {
                        tracing::debug!(scanned = report.scanned, "Retention sweep finished");
                    }
                    Err(e) => tracing::error!("Retention sweep failed: {}", e),
                }
            }
        })
    }
}

async fn remove_session_dir(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        // already gone, e.g. removed by a concurrent sweep
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
