//! Error handling for the tack CLI.
//!
//! `CliError` wraps the library errors via `#[from]` and adds the failures
//! only the CLI can hit (missing files, bad arguments). Commands return
//! [`Result`]; `main` turns errors into miette reports.
//!
//! # Example
//!
//! ```rust,no_run
//! use tack_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_manifest(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Run `tack check` to see which module failed")
//! }
//! ```

mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] tack_config::ConfigError),

    /// The build pass failed
    #[error(transparent)]
    Assembly(#[from] tack_assembly::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn with_path_maps_not_found() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.with_path("tack.toml").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p == &PathBuf::from("tack.toml")));
    }

    #[test]
    fn with_path_keeps_other_io_errors() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(result.with_path("x").unwrap_err(), CliError::Io(_)));
    }

    #[test]
    fn with_hint_appends_hint() {
        let result: Result<()> = Err(CliError::InvalidArgument("--out".to_string()));
        let msg = result.with_hint("pass a file path").unwrap_err().to_string();
        assert!(msg.contains("Invalid argument: --out"));
        assert!(msg.contains("Hint: pass a file path"));
    }

    #[test]
    fn context_prefixes_message() {
        let result: Result<()> = Err(CliError::Custom("boom".to_string()));
        let msg = result.context("Failed to write module").unwrap_err().to_string();
        assert_eq!(msg, "Failed to write module: boom");
    }

    #[test]
    fn assembly_errors_are_transparent() {
        let err: CliError = tack_assembly::Error::MissingCollaborator {
            role: tack_assembly::StageRole::Branding,
        }
        .into();
        assert_eq!(err.to_string(), "no branding stage is registered");
    }
}
