//! User-facing console lines, kept separate from tracing logs.
//!
//! Primary outputs (the run summary and dry-run plan lines) are plain and
//! unprefixed so schedulers and scripts can parse them; advisory lines get
//! a colored severity prefix when the stream is a TTY.

use owo_colors::OwoColorize;

enum Severity {
    Info,
    Warn,
    Error,
    Success,
}

impl Severity {
    fn prefix(&self, colored: bool) -> String {
        match (self, colored) {
            (Severity::Info, true) => "info:".cyan().bold().to_string(),
            (Severity::Info, false) => "info:".to_string(),
            (Severity::Warn, true) => "warn:".yellow().bold().to_string(),
            (Severity::Warn, false) => "warn:".to_string(),
            (Severity::Error, true) => "error:".red().bold().to_string(),
            (Severity::Error, false) => "error:".to_string(),
            (Severity::Success, true) => "ok:".green().bold().to_string(),
            (Severity::Success, false) => "ok:".to_string(),
        }
    }
}

fn emit(severity: Severity, msg: &str) {
    match severity {
        Severity::Warn | Severity::Error => {
            let prefix = severity.prefix(atty::is(atty::Stream::Stderr));
            eprintln!("{prefix} {msg}");
        }
        _ => {
            let prefix = severity.prefix(atty::is(atty::Stream::Stdout));
            println!("{prefix} {msg}");
        }
    }
}

pub fn print_info(msg: &str) {
    emit(Severity::Info, msg);
}

pub fn print_warn(msg: &str) {
    emit(Severity::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Severity::Error, msg);
}

pub fn print_success(msg: &str) {
    emit(Severity::Success, msg);
}

/// Unprefixed primary output (summary and dry-run plan lines).
pub fn print_user(msg: &str) {
    println!("{msg}");
}
