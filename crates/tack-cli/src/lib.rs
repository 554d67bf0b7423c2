//! tack CLI - assemble the tack-config module for a platform build.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`commands`] - `build` and `check` implementations
//! - [`error`] - CLI error type with conversion to miette reports
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - Terminal status messages and formatting
//!
//! # Example
//!
//! ```rust,no_run
//! use tack_cli::{cli::CheckArgs, commands, logger};
//!
//! fn main() -> tack_cli::Result<()> {
//!     logger::init_logger(false, false, false);
//!     commands::check_execute(CheckArgs { config: None })
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
