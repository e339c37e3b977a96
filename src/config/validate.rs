//! Namespace-root validation.
//! Verifies the source root exists and is readable, prepares the
//! destination root, and ensures the two are disjoint.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Validate the two namespace roots before any work starts.
///
/// - `source` must exist, be a directory, and be readable.
/// - `dest` is created if missing (skipped when `read_only`, i.e. dry-run)
///   and must be writable.
/// - The roots must be disjoint: neither equal to nor nested within the
///   other, after resolving symlinks.
pub fn validate_roots(source: &Path, dest: &Path, read_only: bool) -> Result<()> {
    if !source.exists() {
        bail!("source root does not exist: {}", source.display());
    }
    if !source.is_dir() {
        bail!("source root is not a directory: {}", source.display());
    }
    fs::read_dir(source).with_context(|| {
        format!(
            "cannot read source root '{}'; check permissions",
            source.display()
        )
    })?;
    debug!(root = %source.display(), "Source root readable");

    if dest.exists() && !dest.is_dir() {
        bail!("destination root exists but isn't a directory: {}", dest.display());
    }
    if !dest.exists() {
        if read_only {
            bail!(
                "destination root does not exist: {} (not creating it in dry-run)",
                dest.display()
            );
        }
        fs::create_dir_all(dest).with_context(|| {
            format!("failed to create destination root '{}'", dest.display())
        })?;
        info!(root = %dest.display(), "Created destination root");
    }
    if !read_only {
        ensure_writable(dest)?;
    }

    let src_real = fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
    let dst_real = fs::canonicalize(dest).unwrap_or_else(|_| dest.to_path_buf());
    if src_real == dst_real {
        bail!(
            "source and destination roots resolve to the same path: '{}'",
            src_real.display()
        );
    }
    if src_real.starts_with(&dst_real) {
        bail!(
            "source root '{}' must not be inside destination root '{}'",
            src_real.display(),
            dst_real.display()
        );
    }
    if dst_real.starts_with(&src_real) {
        bail!(
            "destination root '{}' must not be inside source root '{}'",
            dst_real.display(),
            src_real.display()
        );
    }

    info!(source = %source.display(), dest = %dest.display(), "Roots validated");
    Ok(())
}

/// Non-destructive writability probe: create and remove a small temp file.
fn ensure_writable(dir: &Path) -> Result<()> {
    let probe = dir.join(format!(".partition_move_probe_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)
        .with_context(|| {
            format!("cannot write to destination root '{}'", dir.display())
        })?;
    let _ = fs::remove_file(&probe);
    debug!(root = %dir.display(), "Destination root writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn accepts_disjoint_roots_and_creates_destination() {
        let td = tempdir().unwrap();
        let src = td.path().join("src");
        let dst = td.path().join("dst");
        fs::create_dir_all(&src).unwrap();

        validate_roots(&src, &dst, false).unwrap();
        assert!(dst.is_dir());
    }

    #[test]
    fn rejects_missing_source() {
        let td = tempdir().unwrap();
        let err = validate_roots(&td.path().join("nope"), &td.path().join("dst"), false)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn rejects_identical_roots() {
        let td = tempdir().unwrap();
        let root = td.path().join("both");
        fs::create_dir_all(&root).unwrap();
        assert!(validate_roots(&root, &root, false).is_err());
    }

    #[test]
    fn rejects_nested_roots() {
        let td = tempdir().unwrap();
        let outer = td.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(&inner).unwrap();
        assert!(validate_roots(&outer, &inner, false).is_err());
        assert!(validate_roots(&inner, &outer, false).is_err());
    }

    #[test]
    fn dry_run_does_not_create_destination() {
        let td = tempdir().unwrap();
        let src = td.path().join("src");
        let dst = td.path().join("dst");
        fs::create_dir_all(&src).unwrap();

        assert!(validate_roots(&src, &dst, true).is_err());
        assert!(!dst.exists());
    }
}
