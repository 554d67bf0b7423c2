//! Logging setup for the tack CLI.
//!
//! Verbosity is picked in this order:
//! 1. `--verbose`: debug level for tack crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`: custom filter
//! 4. Default: info level for tack crates
//!
//! The subscriber itself comes from `tack_assembly::logging` and writes to
//! stderr so the generated module can be piped from stdout.

use tack_assembly::logging::{self, EnvFilter, LogLevel};

/// Level forced by the flags, if any.
pub fn level_for(verbose: bool, quiet: bool) -> Option<LogLevel> {
    if verbose {
        Some(LogLevel::Debug)
    } else if quiet {
        Some(LogLevel::Error)
    } else {
        None
    }
}

/// Pick the filter for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    match level_for(verbose, quiet) {
        Some(level) => level.filter(),
        None => logging::env_or(LogLevel::Info),
    }
}

/// Initialize the tracing subscriber. Call once, before any logging.
///
/// # Examples
///
/// ```rust,no_run
/// use tack_cli::logger::init_logger;
///
/// // Debug logging without colors (CI)
/// init_logger(true, false, true);
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    if !logging::install(filter_for(verbose, quiet), !no_color) {
        tracing::debug!("subscriber already installed");
    }
}
