//! Temporary file cleanup for the shared working directory

use crate::error::{CleanupFailure, SnipError, SnipResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bytecode caches written next to interpreted sources
const CACHE_DIRS: &[&str] = &["__pycache__"];

/// Outcome of a cleanup pass that hit no errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub removed: usize,
    /// Prefixed files left alone because they were too young
    pub kept: usize,
}

/// Remove every file in `work_dir` whose name starts with `prefix`.
///
/// With `older_than`, only files last modified at least that long ago are
/// removed. Individual failures do not stop the pass; they are collected
/// into a single [`SnipError::Cleanup`].
pub async fn sweep(
    work_dir: &Path,
    prefix: &str,
    older_than: Option<Duration>,
) -> SnipResult<CleanupSummary> {
    let mut summary = CleanupSummary::default();
    let mut failures = Vec::new();

    let mut dirs = vec![work_dir.to_path_buf()];
    dirs.extend(CACHE_DIRS.iter().map(|name| work_dir.join(name)));

    for dir in dirs {
        sweep_dir(&dir, prefix, older_than, &mut summary, &mut failures).await;
    }

    if failures.is_empty() {
        info!(
            "Cleanup of {} removed {} file(s), kept {}",
            work_dir.display(),
            summary.removed,
            summary.kept
        );
        Ok(summary)
    } else {
        warn!(
            "Cleanup of {} failed on {} file(s)",
            work_dir.display(),
            failures.len()
        );
        Err(SnipError::Cleanup {
            removed: summary.removed,
            failures,
        })
    }
}

async fn sweep_dir(
    dir: &Path,
    prefix: &str,
    older_than: Option<Duration>,
    summary: &mut CleanupSummary,
    failures: &mut Vec<CleanupFailure>,
) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            failures.push(CleanupFailure {
                path: dir.to_path_buf(),
                message: e.to_string(),
            });
            return;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                failures.push(CleanupFailure {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
                break;
            }
        };

        let path = entry.path();
        let eligible = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix));
        if !eligible {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                failures.push(CleanupFailure {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        if let Some(min_age) = older_than {
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .unwrap_or_default();
            if age < min_age {
                summary.kept += 1;
                continue;
            }
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                summary.removed += 1;
            }
            // raced with the request that owns it
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => failures.push(CleanupFailure {
                path,
                message: e.to_string(),
            }),
        }
    }
}

/// Run [`sweep`] every `period` until `cancel` fires
pub fn spawn_periodic(
    work_dir: PathBuf,
    prefix: String,
    period: Duration,
    older_than: Option<Duration>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Periodic cleanup stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = sweep(&work_dir, &prefix, older_than).await {
                        warn!("Periodic cleanup: {}", e);
                    }
                }
            }
        }
    })
}
