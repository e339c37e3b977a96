//! Runtime configuration and verbosity types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{DEFAULT_WORKERS, paths};
use crate::checkpoint::DEFAULT_CHECKPOINT_FILE;

/// Console verbosity, coarser than raw tracing levels so config files and
/// flags stay simple. Maps onto level filters at logging init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Quiet,
    #[default]
    Normal,
    /// Verbose progress detail.
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Ok(LogLevel::Quiet),
            "normal" => Ok(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            other => Err(format!("invalid log level: '{other}'")),
        }
    }
}

impl LogLevel {
    /// Lenient parse for config values; accepts the same aliases as
    /// [`FromStr`], case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

/// Effective run settings after merging the config file and CLI flags.
/// The namespace roots are deliberately absent: they are positional CLI
/// arguments only, never defaulted from a file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Requested worker-pool size; trimmed to the pending-file count later.
    pub workers: usize,
    pub checkpoint_file: PathBuf,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
    /// Compute and print the pending set without modifying anything.
    pub dry_run: bool,
    /// Leaf file names excluded from enumeration.
    pub exclude_names: Vec<String>,
    /// Parent directory names excluded from enumeration.
    pub exclude_parents: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            checkpoint_file: PathBuf::from(DEFAULT_CHECKPOINT_FILE),
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path(),
            dry_run: false,
            exclude_names: Vec::new(),
            exclude_parents: Vec::new(),
        }
    }
}
