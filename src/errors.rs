//! Typed error definitions for partition_move.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::path::PathBuf;
use thiserror::Error;

use crate::partition::PartitionDay;

#[derive(Debug, Error)]
pub enum MoverError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),

    #[error("Source partition absent for day {0}")]
    PartitionSkipped(PartitionDay),

    #[error("Storage namespace unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Transfer failed for {path}: {source}")]
    TransferFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Work queue full (capacity {0})")]
    QueueFull(usize),

    #[error("Path {path} is not under namespace root {root}")]
    OutsideNamespace { path: PathBuf, root: PathBuf },
}
