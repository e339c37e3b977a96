//! Local/mounted-filesystem adapter for [`StorageClient`].
//!
//! Serves both namespaces when the "remote" storage is mounted into the
//! local tree (NFS, FUSE mounts, or plain directories in tests).
//!
//! Durability notes:
//! - `create_new` opens with `create_new(true)` so an occupied path is
//!   never clobbered; `finish` flushes and fsyncs the file.
//! - `rename` fsyncs the destination's parent directory on Unix
//!   (best-effort) so the publish survives a crash.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{BlobWriter, COPY_BUF_SIZE, StorageClient, StorageEntry};
use crate::errors::MoverError;

#[derive(Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Bind a client to a namespace root. The root must already exist and
    /// be a directory; anything else is a startup-fatal condition.
    pub fn connect(root: impl Into<PathBuf>) -> Result<Self, MoverError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {
                debug!(root = %root.display(), "Bound local storage namespace");
                Ok(Self { root })
            }
            Ok(_) => Err(MoverError::StorageUnavailable {
                path: root,
                source: io::Error::new(io::ErrorKind::NotADirectory, "namespace root is a file"),
            }),
            Err(source) => Err(MoverError::StorageUnavailable { path: root, source }),
        }
    }
}

struct LocalBlobWriter {
    inner: BufWriter<File>,
}

impl Write for LocalBlobWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl BlobWriter for LocalBlobWriter {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.inner.flush()?;
        self.inner.get_ref().sync_all()
    }
}

impl StorageClient for LocalStorage {
    fn root(&self) -> &Path {
        &self.root
    }

    fn stat(&self, path: &Path) -> io::Result<Option<StorageEntry>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(StorageEntry {
                path: path.to_path_buf(),
                is_dir: meta.is_dir(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list(&self, path: &Path) -> io::Result<Vec<StorageEntry>> {
        let mut entries = Vec::new();
        for ent in fs::read_dir(path)? {
            let ent = ent?;
            let is_dir = ent.file_type()?.is_dir();
            entries.push(StorageEntry {
                path: ent.path(),
                is_dir,
            });
        }
        // read_dir order is filesystem-dependent; callers rely on a stable
        // listing order.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }

    fn create_new(&self, path: &Path) -> io::Result<Box<dyn BlobWriter>> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(Box::new(LocalBlobWriter {
            inner: BufWriter::with_capacity(COPY_BUF_SIZE, file),
        }))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)?;
        // Persist the rename itself; a failed directory sync must not turn
        // a completed rename into an error.
        #[cfg(unix)]
        if let Some(parent) = to.parent() {
            let _ = fsync_dir(parent);
        }
        Ok(())
    }

    fn delete(&self, path: &Path, recursive: bool) -> io::Result<()> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => {
                if recursive {
                    fs::remove_dir_all(path)
                } else {
                    fs::remove_dir(path)
                }
            }
            Ok(_) => fs::remove_file(path),
            Err(e) => Err(e),
        }
    }

    fn mkdirs(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn close(&self) -> io::Result<()> {
        debug!(root = %self.root.display(), "Closed local storage namespace");
        Ok(())
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}
