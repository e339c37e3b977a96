//! Tracing initialization for the binary.
//!
//! Verbosity comes from [`LogLevel`] alone (no RUST_LOG override), stdout
//! formatting is compact or JSON per the `--json` flag, and an optional
//! non-blocking file layer is added when a log file is configured. File
//! logging is refused when any ancestor of the log path is a symlink.

use anyhow::Result;
use chrono::Local;
use partition_move::config::{LogLevel, path_has_symlink_ancestor};
use partition_move::output as out;
use std::fmt as stdfmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Local-time timestamps (DD/MM/YY HH:MM:SS) for human-read logs.
struct HumanTime;

impl FormatTime for HumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

fn filter_for(lvl: LogLevel) -> EnvFilter {
    EnvFilter::new(match lvl {
        LogLevel::Quiet => "error",
        LogLevel::Normal => "info",
        LogLevel::Info => "debug",
        LogLevel::Debug => "trace",
    })
}

/// Open a non-blocking appender for the log file, or explain why not.
/// All refusals are non-fatal; logging falls back to stdout only.
fn open_log_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            out::print_warn(&format!(
                "Refusing file logging: an ancestor of '{}' is a symlink.",
                path.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!(
                "Could not inspect log path '{}': {e}.",
                path.display()
            ));
            return None;
        }
    }

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            out::print_warn(&format!(
                "Could not open log file '{}': {e}. Logs continue on stdout only.",
                path.display()
            ));
            None
        }
    }
}

/// Install the global subscriber. Returns the appender guard when a file
/// layer was added; it must live until exit so buffered logs flush.
pub fn init_tracing(
    lvl: LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let filter = filter_for(lvl);

    let mut guard = None;
    let file_writer = log_file.and_then(open_log_writer).map(|(writer, g)| {
        guard = Some(g);
        writer
    });

    // The json and compact formatters are distinct types, so each arm
    // assembles its own pair of layers; the file layer is optional.
    if json {
        let stdout_layer = tsfmt::layer()
            .json()
            .with_timer(HumanTime)
            .with_thread_ids(true);
        let file_layer = file_writer.map(|w| {
            tsfmt::layer()
                .json()
                .with_timer(HumanTime)
                .with_thread_ids(true)
                .with_writer(w)
        });
        registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        let stdout_layer = tsfmt::layer()
            .with_timer(HumanTime)
            .with_thread_ids(true)
            .compact();
        let file_layer = file_writer.map(|w| {
            tsfmt::layer()
                .with_timer(HumanTime)
                .with_thread_ids(true)
                .compact()
                .with_writer(w)
        });
        registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .init();
    }
    Ok(guard)
}
