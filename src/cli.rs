//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Positional surface (kept stable for scheduled jobs):
//!   SOURCE_ROOT DEST_ROOT [WORKERS] [START_DAY]
//! Flags override config-file values; --debug is shorthand for
//! --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use partition_move::config::{Config, LogLevel};

/// CLI wrapper for the partition_move library.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Move date-partitioned file trees between storage namespaces, resuming from a checkpointed day"
)]
pub struct Args {
    /// Source namespace root containing `<root>/<yyyyMMdd>/...` partitions.
    #[arg(
        value_name = "SOURCE_ROOT",
        value_hint = ValueHint::DirPath,
        required_unless_present = "print_config"
    )]
    pub source_root: Option<PathBuf>,

    /// Destination namespace root to mirror partitions into.
    #[arg(
        value_name = "DEST_ROOT",
        value_hint = ValueHint::DirPath,
        required_unless_present = "print_config"
    )]
    pub dest_root: Option<PathBuf>,

    /// Worker-pool size; trimmed to the pending-file count at run time.
    #[arg(value_name = "WORKERS", value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Start day override (yyyyMMdd). Default: last checkpoint, else today.
    #[arg(value_name = "START_DAY")]
    pub start_day: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Override where the resumability checkpoint is stored.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub checkpoint_file: Option<PathBuf>,

    /// Exclude leaf files with this exact name (repeatable).
    #[arg(long = "exclude-name", value_name = "NAME")]
    pub exclude_names: Vec<String>,

    /// Exclude files whose parent directory has this exact name (repeatable).
    #[arg(long = "exclude-parent", value_name = "NAME")]
    pub exclude_parents: Vec<String>,

    /// Compute and print the pending set, but move nothing and write nothing.
    #[arg(long, help = "Show what would be transferred without modifying anything")]
    pub dry_run: bool,

    /// Print where partition_move will look for the config file, then exit.
    #[arg(long, help = "Print the config file location used by partition_move and exit")]
    pub print_config: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid worker count"))?;
    if n < 1 {
        return Err("worker count must be at least 1".to_string());
    }
    Ok(n)
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if let Some(path) = &self.checkpoint_file {
            cfg.checkpoint_file = path.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        cfg.exclude_names.extend(self.exclude_names.iter().cloned());
        cfg.exclude_parents
            .extend(self.exclude_parents.iter().cloned());
    }
}

pub fn parse() -> Args {
    Args::parse()
}
