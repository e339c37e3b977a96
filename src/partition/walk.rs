//! Leaf-file enumeration under a namespace root.
//!
//! Recursive descent over [`StorageClient::list`], skipping any subtree
//! whose path contains the in-progress marker segment and any entry
//! rejected by the exclusion filter.
//!
//! Quirk, kept on purpose: when a directory's filtered listing holds
//! exactly one entry and that entry is a file, the entry is yielded as a
//! leaf immediately ("single-child shortcut"). This is the fast path for
//! one-file-per-directory partition layouts. A sole entry that is a
//! directory recurses normally, and an empty directory yields nothing.

use std::path::{Path, PathBuf};

use crate::errors::MoverError;
use crate::storage::{StorageClient, StorageEntry};

/// Path segment marking a subtree still being written by an upstream
/// producer. Matched by exact path-component equality.
pub const IN_PROGRESS_MARKER: &str = "_temporary";

/// Optional exclusion of entries by leaf name or parent-directory name.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    pub names: Vec<String>,
    pub parents: Vec<String>,
}

impl ExcludeFilter {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.parents.is_empty()
    }

    fn allows(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && self.names.iter().any(|n| n == name)
        {
            return false;
        }
        if let Some(parent) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str())
            && self.parents.iter().any(|p| p == parent)
        {
            return false;
        }
        true
    }
}

fn contains_marker(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == IN_PROGRESS_MARKER)
}

/// All leaf files reachable under `root`, in listing order.
///
/// Fails with [`MoverError::NotFound`] when `root` matches nothing; storage
/// errors propagate without local retry.
pub fn leaf_files(
    client: &dyn StorageClient,
    root: &Path,
    filter: &ExcludeFilter,
) -> Result<Vec<PathBuf>, MoverError> {
    let entry = client
        .stat(root)
        .map_err(|source| MoverError::StorageUnavailable {
            path: root.to_path_buf(),
            source,
        })?
        .ok_or_else(|| MoverError::NotFound(root.to_path_buf()))?;

    let mut leaves = Vec::new();
    if entry.is_dir {
        descend(client, root, filter, &mut leaves)?;
    } else if filter.allows(root) {
        leaves.push(entry.path);
    }
    Ok(leaves)
}

fn descend(
    client: &dyn StorageClient,
    dir: &Path,
    filter: &ExcludeFilter,
    leaves: &mut Vec<PathBuf>,
) -> Result<(), MoverError> {
    if contains_marker(dir) {
        return Ok(());
    }

    let entries: Vec<StorageEntry> = client
        .list(dir)
        .map_err(|source| MoverError::StorageUnavailable {
            path: dir.to_path_buf(),
            source,
        })?
        .into_iter()
        .filter(|e| filter.allows(&e.path))
        .collect();

    // Single-child shortcut: a lone file is the leaf, no further checks.
    if entries.len() == 1 && !entries[0].is_dir {
        leaves.push(entries[0].path.clone());
        return Ok(());
    }

    for entry in entries {
        if entry.is_dir {
            descend(client, &entry.path, filter, leaves)?;
        } else {
            leaves.push(entry.path);
        }
    }
    Ok(())
}
