//! The atomic single-file transfer unit.
//!
//! Copy to a unique temporary sibling, then rename to the final path. The
//! rename is the sole publish step: a reader of the destination namespace
//! sees either nothing or the complete file, never a partial one. No
//! retries; a failure is terminal for that file for this run.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::MoverError;
use crate::partition::{MirrorPair, PendingFile};
use crate::storage::copy_between;

pub const TEMP_PREFIX: &str = ".partition_move.";
pub const TEMP_SUFFIX: &str = ".tmp";

/// Process-wide success/failure tallies. The only state mutated
/// concurrently by workers; atomic increments need no further locking.
#[derive(Debug, Default)]
pub struct MoveCounters {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl MoveCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Whether a file name is one of our temporary transfer artifacts.
pub fn is_temp_artifact(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(TEMP_PREFIX) && n.ends_with(TEMP_SUFFIX))
}

/// Unique temporary sibling in the same directory as the final path, so
/// the publishing rename never crosses directories.
fn temp_sibling(dest: &Path) -> PathBuf {
    dest.with_file_name(format!("{TEMP_PREFIX}{}{TEMP_SUFFIX}", Uuid::new_v4()))
}

/// Move one pending file and record the outcome. Never panics; the caller
/// signals the completion latch after this returns, in every outcome.
pub fn run(pair: &MirrorPair, pending: &PendingFile, counters: &MoveCounters) {
    let worker = std::thread::current();
    let worker = worker.name().unwrap_or("worker");
    match execute(pair, pending) {
        Ok(dest) => {
            counters.record_success();
            info!(
                worker,
                source = %pending.source_path.display(),
                dest = %dest.display(),
                "Transfer succeeded"
            );
        }
        Err(e) => {
            counters.record_failure();
            warn!(
                worker,
                source = %pending.source_path.display(),
                error = %e,
                "Transfer failed"
            );
        }
    }
}

fn execute(pair: &MirrorPair, pending: &PendingFile) -> Result<PathBuf, MoverError> {
    let source = &pending.source_path;
    let dest = pair.to_dest(source)?;
    let temp = temp_sibling(&dest);

    // Nested layouts need intermediate directories below the partition day.
    if let Some(parent) = dest.parent()
        && let Err(e) = pair.dest.mkdirs(parent)
    {
        return Err(MoverError::TransferFailed {
            path: source.clone(),
            source: e,
        });
    }

    let outcome = copy_between(pair.source.as_ref(), source, pair.dest.as_ref(), &temp)
        .and_then(|_| pair.dest.rename(&temp, &dest));

    match outcome {
        Ok(()) => Ok(dest),
        Err(e) => {
            cleanup_temp(pair, &temp);
            Err(MoverError::TransferFailed {
                path: source.clone(),
                source: e,
            })
        }
    }
}

/// Best-effort removal of a temp artifact after a failed transfer. A
/// failure here is logged only, never escalated.
fn cleanup_temp(pair: &MirrorPair, temp: &Path) {
    match pair.dest.delete(temp, true) {
        Ok(()) => debug!(temp = %temp.display(), "Removed temp artifact after failure"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(temp = %temp.display(), error = %e, "Temp artifact cleanup failed")
        }
    }
}
