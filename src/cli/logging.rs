// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI diagnostics.
//!
//! Stdout carries exactly one JSON line, so diagnostics go to stderr and only
//! when `--verbose` is set. Failures are still reported in the JSON payload.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::{ColoredString, Colorize};

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress and timing.
    Info,
    /// Suspicious but usable model output.
    Warn,
    /// The failure behind an `{"error": ...}` response.
    Error,
}

impl Level {
    fn tag(self) -> ColoredString {
        match self {
            Self::Info => "npk".green().bold(),
            Self::Warn => "warning".yellow().bold(),
            Self::Error => "error".red().bold(),
        }
    }
}

/// Render one diagnostic line.
#[must_use]
pub fn format_line(level: Level, message: fmt::Arguments<'_>) -> String {
    format!("{}: {message}", level.tag())
}

/// Write a diagnostic line to stderr if verbose output is enabled.
pub fn emit(level: Level, message: fmt::Arguments<'_>) {
    if is_verbose() {
        eprintln!("{}", format_line(level, message));
    }
}

/// Macro for verbose progress messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Info, format_args!($($arg)*))
    };
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Warn, format_args!($($arg)*))
    };
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Error, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_toggle() {
        set_verbose(true);
        assert!(is_verbose());

        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_format_line() {
        colored::control::set_override(false);
        assert_eq!(format_line(Level::Info, format_args!("loaded {}", "m.onnx")), "npk: loaded m.onnx");
        assert_eq!(format_line(Level::Warn, format_args!("1 value")), "warning: 1 value");
        assert_eq!(format_line(Level::Error, format_args!("boom")), "error: boom");
    }
}
