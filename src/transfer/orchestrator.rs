//! Run orchestration: pool sizing, task submission, the completion join,
//! checkpoint advancement, and pool/client teardown.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::checkpoint::CheckpointStore;
use crate::partition::{MirrorPair, PartitionDay, PendingFile};
use crate::storage::StorageClient;
use crate::transfer::pool::{CompletionLatch, WorkerPool};
use crate::transfer::task::{self, MoveCounters};

const SHUTDOWN_POLL: Duration = Duration::from_secs(1);
const SHUTDOWN_MAX_POLLS: usize = 10;

/// Aggregate outcome of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
    /// The day persisted as the new checkpoint, when the join drained.
    pub checkpoint: Option<PartitionDay>,
}

impl RunReport {
    fn no_work(elapsed: Duration) -> Self {
        Self {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            elapsed,
            checkpoint: None,
        }
    }
}

/// The single decision point for checkpoint advancement: the day of the
/// last entry of the originally submitted pending list, by positional
/// order, regardless of individual transfer outcomes. A stop-at-first-gap
/// policy would replace only this function.
fn checkpoint_day_after_run(pending: &[PendingFile]) -> Option<PartitionDay> {
    pending.last().map(|p| p.day)
}

/// Execute every pending transfer on a bounded worker pool, join on
/// completion, persist the checkpoint, and tear everything down.
///
/// Per-file failures are tallied, never propagated; the report is the only
/// outcome surface.
pub fn transfer_all(
    pair: Arc<MirrorPair>,
    pending: Vec<PendingFile>,
    requested_workers: usize,
    store: &CheckpointStore,
) -> RunReport {
    let started = Instant::now();
    let total = pending.len();
    if total == 0 {
        info!("No pending files; nothing to transfer");
        pair.close();
        return RunReport::no_work(started.elapsed());
    }

    let core = requested_workers.min(total);
    let max = core * 2;
    info!(core, max, queue = total, "Worker pool started");

    let new_checkpoint = checkpoint_day_after_run(&pending);
    let mut pool = WorkerPool::new(core, max, total);
    let latch = Arc::new(CompletionLatch::new(total));
    let counters = Arc::new(MoveCounters::new());

    for file in pending {
        let pair = Arc::clone(&pair);
        let latch_for_task = Arc::clone(&latch);
        let counters_for_task = Arc::clone(&counters);
        let submitted = pool.submit(Box::new(move || {
            task::run(&pair, &file, &counters_for_task);
            latch_for_task.count_down();
        }));
        // Cannot happen with the queue sized to the pending count, but a
        // rejected submission must be loud and must not wedge the join.
        if let Err(e) = submitted {
            error!(error = %e, "Task submission rejected");
            counters.record_failure();
            latch.count_down();
        }
    }

    let drained = latch.wait();
    if !drained {
        warn!(
            unfinished = latch.pending(),
            "Wait interrupted before all tasks completed; skipping checkpoint update"
        );
    }

    pool.shutdown(SHUTDOWN_POLL, SHUTDOWN_MAX_POLLS);
    info!("Worker pool stopped");
    pair.close();

    let checkpoint = if drained { new_checkpoint } else { None };
    if let Some(day) = checkpoint {
        match store.write(&day.to_string()) {
            Ok(()) => info!(%day, path = %store.path().display(), "Checkpoint advanced"),
            Err(e) => warn!(%day, error = %e, "Failed to persist checkpoint"),
        }
    }

    let report = RunReport {
        attempted: total,
        succeeded: counters.succeeded(),
        failed: counters.failed(),
        elapsed: started.elapsed(),
        checkpoint,
    };
    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Transfer run complete"
    );
    report
}

/// Remove temp artifacts left in the destination partitions of the
/// resolved day range by crashed prior runs. Best-effort throughout.
pub fn sweep_orphan_temps(pair: &MirrorPair, days: &[PartitionDay]) {
    for day in days {
        let dest_day = pair.dest_root().join(day.to_string());
        match pair.dest.stat(&dest_day) {
            Ok(Some(entry)) if entry.is_dir => sweep_dir(pair.dest.as_ref(), &dest_day),
            _ => {}
        }
    }
}

fn sweep_dir(client: &dyn StorageClient, dir: &std::path::Path) {
    let entries = match client.list(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Orphan sweep could not list directory");
            return;
        }
    };
    for entry in entries {
        if entry.is_dir {
            sweep_dir(client, &entry.path);
        } else if task::is_temp_artifact(&entry.path) {
            match client.delete(&entry.path, false) {
                Ok(()) => debug!(path = %entry.path.display(), "Removed orphan temp artifact"),
                Err(e) => {
                    warn!(path = %entry.path.display(), error = %e, "Failed to remove orphan temp artifact")
                }
            }
        }
    }
}
