//! Concurrent transfer execution: bounded worker pool, per-file move
//! tasks, and the orchestrator that joins on completion and advances the
//! checkpoint.

pub mod orchestrator;
pub mod pool;
pub mod task;

pub use orchestrator::{RunReport, sweep_orphan_temps, transfer_all};
pub use pool::{CompletionLatch, WorkerPool};
pub use task::MoveCounters;
