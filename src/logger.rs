//! Tag-based console logger for hostwatch
//!
//! Colored console output with standard levels (Error/Warning/Info/Debug).
//! Debug lines are only shown when the matching `--debug-<module>` flag is
//! present on the command line.
//!
//! ```rust,ignore
//! use hostwatch::logger::{self, LogTag};
//!
//! logger::info(LogTag::System, "starting up");
//! logger::debug(LogTag::Probe, "raw response: ...");  // only with --debug-probe
//! ```

use chrono::Utc;
use colored::*;
use std::io::{self, Write};

use crate::arguments;

/// Source subsystem of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Telegram,
    Db,
    Probe,
}

impl LogTag {
    fn label(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Telegram => "TELEGRAM",
            LogTag::Db => "DB",
            LogTag::Probe => "PROBE",
        }
    }

    /// Whether `--debug-<tag>` was passed for this tag
    fn debug_enabled(&self) -> bool {
        match self {
            LogTag::Telegram => arguments::is_debug_telegram_enabled(),
            LogTag::Db => arguments::is_debug_db_enabled(),
            LogTag::Probe => arguments::is_debug_probe_enabled(),
            LogTag::System => arguments::has_arg("--debug-all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn write_line(tag: LogTag, level: LogLevel, message: &str) {
    let ts = format!("[{}]", timestamp()).dimmed();
    let label = tag.label();
    let line = match level {
        LogLevel::Error => format!("{} {} {} {}", "❌".red().bold(), label.red().bold(), ts, message.red()),
        LogLevel::Warning => format!("{} {} {} {}", "⚠".yellow().bold(), label.yellow().bold(), ts, message.yellow()),
        LogLevel::Info => format!("{} {} {} {}", "ℹ".blue().bold(), label.blue().bold(), ts, message),
        LogLevel::Debug => format!("{} {} {} {}", "🐛".purple().bold(), label.purple().bold(), ts, message.dimmed()),
    };
    println!("{}", line);
    let _ = io::stdout().flush();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    write_line(tag, LogLevel::Error, message);
}

/// Log at WARNING level (always shown)
pub fn warning(tag: LogTag, message: &str) {
    write_line(tag, LogLevel::Warning, message);
}

/// Log at INFO level (always shown)
pub fn info(tag: LogTag, message: &str) {
    write_line(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (shown only with --debug-<module> for this tag)
pub fn debug(tag: LogTag, message: &str) {
    if tag.debug_enabled() {
        write_line(tag, LogLevel::Debug, message);
    }
}
