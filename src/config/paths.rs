//! OS-appropriate default locations and log-path safety checks.

use dirs::{config_dir, data_dir};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "partition_move";

fn in_app_dir(base: Option<PathBuf>, home_fallback: &[&str], file: &str) -> Option<PathBuf> {
    let base = base.or_else(|| {
        let home = std::env::var_os("HOME")?;
        let mut p = PathBuf::from(home);
        for seg in home_fallback {
            p.push(seg);
        }
        Some(p)
    })?;
    Some(base.join(APP_DIR).join(file))
}

/// Default config file location: the OS config dir, with a `~/.config`
/// fallback when the platform dir cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    in_app_dir(config_dir(), &[".config"], "config.xml")
}

/// Default log file location: the OS data dir, with a `~/.local/share`
/// fallback.
pub fn default_log_path() -> Option<PathBuf> {
    in_app_dir(data_dir(), &[".local", "share"], "partition_move.log")
}

/// True when any existing ancestor of `path` is a symlink. Used to refuse
/// file logging through a redirected directory.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    for ancestor in path.ancestors().skip(1) {
        if !ancestor.exists() {
            continue;
        }
        if fs::symlink_metadata(ancestor)?.file_type().is_symlink() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_end_under_the_app_directory() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("partition_move/config.xml"));
        }
        if let Some(p) = default_log_path() {
            assert!(p.ends_with("partition_move/partition_move.log"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_ancestor_is_detected() {
        use std::os::unix::fs as unix_fs;
        let td = tempfile::tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = td.path().join("link");
        unix_fs::symlink(&real, &link).unwrap();

        assert!(path_has_symlink_ancestor(&link.join("pm.log")).unwrap());
        assert!(!path_has_symlink_ancestor(&real.join("pm.log")).unwrap());
    }
}
