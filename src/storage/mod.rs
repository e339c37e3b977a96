//! Storage namespace abstraction.
//!
//! A [`StorageClient`] is bound to one namespace root and exposes the
//! path-based primitives the mover needs: stat, list, streaming read,
//! exclusive create, rename, delete, mkdirs, close. Two independent
//! instances are used per run (one source-bound, one destination-bound),
//! shared across workers; implementations must be safe for concurrent
//! independent path operations.
//!
//! [`copy_between`] is the one cross-client operation: a buffered streaming
//! copy into a newly created destination blob. The destination is opened
//! with exclusive-create semantics so an existing file is never clobbered;
//! publication at the final path is the caller's rename, not the copy.

pub mod local;

pub use local::LocalStorage;

use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// 1 MiB buffers keep the syscall count down on large partition files.
pub const COPY_BUF_SIZE: usize = 1024 * 1024;

/// One entry of a namespace listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// A writer for a newly created blob. Data is not considered durable until
/// `finish` returns; dropping the writer without finishing leaves an
/// undefined partial blob behind (callers write to throwaway temp paths
/// precisely so that this is harmless).
pub trait BlobWriter: Write + Send {
    /// Flush buffered data and force it to stable storage.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Path-based operations against one storage namespace.
///
/// All paths are fully qualified (rooted under the namespace root).
pub trait StorageClient: Send + Sync {
    /// Namespace root this client was bound to.
    fn root(&self) -> &Path;

    /// Resolve a path to an entry; `None` when the path matches nothing.
    fn stat(&self, path: &Path) -> io::Result<Option<StorageEntry>>;

    /// List the immediate children of a directory, ordered by name.
    fn list(&self, path: &Path) -> io::Result<Vec<StorageEntry>>;

    /// Open a file for streaming read.
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Create a new blob for writing. Fails with `AlreadyExists` if the
    /// path is already occupied (no-overwrite semantics).
    fn create_new(&self, path: &Path) -> io::Result<Box<dyn BlobWriter>>;

    /// Atomically rename `from` to `to` within this namespace.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a path; `recursive` removes a directory and its contents.
    fn delete(&self, path: &Path, recursive: bool) -> io::Result<()>;

    /// Create a directory and any missing parents.
    fn mkdirs(&self, path: &Path) -> io::Result<()>;

    /// Release any resources held by this client.
    fn close(&self) -> io::Result<()>;
}

/// Stream one file between two clients. Returns the number of bytes copied.
///
/// The destination blob is created exclusively and synced before return, so
/// a success means the full content is durable at `to`.
pub fn copy_between(
    src: &dyn StorageClient,
    from: &Path,
    dst: &dyn StorageClient,
    to: &Path,
) -> io::Result<u64> {
    let reader = src.open_read(from)?;
    let mut reader = BufReader::with_capacity(COPY_BUF_SIZE, reader);
    let mut writer = dst.create_new(to)?;
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.finish()?;
    Ok(bytes)
}
