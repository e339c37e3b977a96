//! Resumability checkpoint: a single-line text blob at a well-known path.
//!
//! Read once at startup, written once after the worker pool drains. The
//! content is the last fully processed partition day (`yyyyMMdd`); parsing
//! and fallback policy live with the day-range resolver, this module only
//! moves the text.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CHECKPOINT_FILE: &str = "partition_move/last_run_day.txt";

pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded marker. `None` when the file is absent or blank;
    /// read errors other than absence also degrade to `None` so a mangled
    /// checkpoint never blocks a run.
    pub fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No readable checkpoint");
                None
            }
        }
    }

    /// Overwrite the marker, creating parent directories as needed.
    pub fn write(&self, marker: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("create checkpoint directory '{}'", parent.display())
            })?;
        }
        fs::write(&self.path, format!("{marker}\n"))
            .with_context(|| format!("write checkpoint '{}'", self.path.display()))?;
        debug!(path = %self.path.display(), marker, "Checkpoint written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_reads_none() {
        let td = tempdir().unwrap();
        let store = CheckpointStore::new(td.path().join("nope.txt"));
        assert_eq!(store.read(), None);
    }

    #[test]
    fn blank_reads_none() {
        let td = tempdir().unwrap();
        let path = td.path().join("cp.txt");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(CheckpointStore::new(path).read(), None);
    }

    #[test]
    fn write_creates_parents_and_round_trips() {
        let td = tempdir().unwrap();
        let store = CheckpointStore::new(td.path().join("state").join("last.txt"));
        store.write("20230101").unwrap();
        assert_eq!(store.read(), Some("20230101".to_string()));

        // Overwrite, not append.
        store.write("20230102").unwrap();
        assert_eq!(store.read(), Some("20230102".to_string()));
    }
}
