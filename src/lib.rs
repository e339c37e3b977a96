//! Core library for `partition_move`.
//!
//! Moves date-partitioned file trees (`<root>/<yyyyMMdd>/...`) from a
//! source storage namespace to a destination namespace, resuming from the
//! last checkpointed partition day and skipping files already mirrored at
//! the destination. Transfers run on a bounded worker pool and publish
//! each file with a copy-to-temp plus atomic-rename protocol so readers
//! never observe a partial file at a final path.

pub mod checkpoint;
pub mod config;
pub mod errors;
pub mod output;
pub mod partition;
pub mod shutdown;
pub mod storage;
pub mod transfer;

pub use checkpoint::CheckpointStore;
pub use config::{Config, LogLevel};
pub use errors::MoverError;
pub use partition::{ExcludeFilter, MirrorPair, PartitionDay, PendingFile};
pub use storage::{LocalStorage, StorageClient};
pub use transfer::RunReport;
