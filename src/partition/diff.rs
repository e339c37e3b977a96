//! Per-day pending-file computation.
//!
//! A file is "already transferred" exactly when substituting the source
//! namespace root with the destination root yields a path that exists at
//! the destination. The diff never mutates source data; the only write it
//! performs is creating a missing destination day directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::MoverError;
use crate::partition::walk::{self, ExcludeFilter};
use crate::partition::PartitionDay;
use crate::storage::StorageClient;

/// One source file not yet mirrored at the destination, stamped with the
/// partition day it belongs to. Produced here, consumed exactly once by a
/// move task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub day: PartitionDay,
    pub source_path: PathBuf,
}

/// The source/destination namespace pairing for one run. Shared across
/// workers; the clients it holds must tolerate concurrent independent
/// path operations.
pub struct MirrorPair {
    pub source: Arc<dyn StorageClient>,
    pub dest: Arc<dyn StorageClient>,
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl MirrorPair {
    pub fn new(source: Arc<dyn StorageClient>, dest: Arc<dyn StorageClient>) -> Self {
        let source_root = source.root().to_path_buf();
        let dest_root = dest.root().to_path_buf();
        Self {
            source,
            dest,
            source_root,
            dest_root,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Map a source path to its destination equivalent by root-prefix
    /// substitution.
    pub fn to_dest(&self, source_path: &Path) -> Result<PathBuf, MoverError> {
        source_path
            .strip_prefix(&self.source_root)
            .map(|rel| self.dest_root.join(rel))
            .map_err(|_| MoverError::OutsideNamespace {
                path: source_path.to_path_buf(),
                root: self.source_root.clone(),
            })
    }

    /// Map a destination path back into the source namespace.
    pub fn to_source(&self, dest_path: &Path) -> Result<PathBuf, MoverError> {
        dest_path
            .strip_prefix(&self.dest_root)
            .map(|rel| self.source_root.join(rel))
            .map_err(|_| MoverError::OutsideNamespace {
                path: dest_path.to_path_buf(),
                root: self.dest_root.clone(),
            })
    }

    /// Close both clients. Failures are logged, never propagated.
    pub fn close(&self) {
        if let Err(e) = self.source.close() {
            warn!(root = %self.source_root.display(), error = %e, "Failed to close source client");
        }
        if let Err(e) = self.dest.close() {
            warn!(root = %self.dest_root.display(), error = %e, "Failed to close destination client");
        }
    }
}

/// Compute the pending files for one day.
///
/// - Absent source day: [`MoverError::PartitionSkipped`] (callers log and
///   move on, this is not a run failure).
/// - Absent destination day: created via mkdirs unless `create_missing` is
///   false; a failed mkdirs degrades to an empty destination set so the
///   day's files are still offered as pending.
/// - A source day that enumerates to zero leaves contributes nothing and
///   does not touch the destination.
pub fn pending_for_day(
    pair: &MirrorPair,
    day: PartitionDay,
    filter: &ExcludeFilter,
    create_missing: bool,
) -> Result<Vec<PendingFile>, MoverError> {
    let source_day = pair.source_root().join(day.to_string());
    let source_stat = pair
        .source
        .stat(&source_day)
        .map_err(|source| MoverError::StorageUnavailable {
            path: source_day.clone(),
            source,
        })?;
    if source_stat.is_none() {
        return Err(MoverError::PartitionSkipped(day));
    }

    let source_leaves = walk::leaf_files(pair.source.as_ref(), &source_day, filter)?;
    if source_leaves.is_empty() {
        debug!(%day, "Source partition holds no leaf files");
        return Ok(Vec::new());
    }

    let dest_day = pair.dest_root().join(day.to_string());
    let mirrored: HashSet<PathBuf> = match pair.dest.stat(&dest_day) {
        Ok(Some(_)) => match walk::leaf_files(pair.dest.as_ref(), &dest_day, filter) {
            Ok(leaves) => leaves
                .iter()
                .filter_map(|p| pair.to_source(p).ok())
                .collect(),
            Err(e) => {
                warn!(%day, error = %e, "Destination enumeration failed; treating as empty");
                HashSet::new()
            }
        },
        Ok(None) | Err(_) => {
            if create_missing
                && let Err(e) = pair.dest.mkdirs(&dest_day)
            {
                warn!(%day, path = %dest_day.display(), error = %e,
                    "Destination partition setup failed; proceeding with empty destination set");
            }
            HashSet::new()
        }
    };

    let pending: Vec<PendingFile> = source_leaves
        .into_iter()
        .filter(|p| !mirrored.contains(p))
        .map(|source_path| PendingFile { day, source_path })
        .collect();

    info!(%day, pending = pending.len(), "Partition diff complete");
    Ok(pending)
}
