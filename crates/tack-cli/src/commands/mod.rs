//! Command implementations for the tack CLI.
//!
//! - [`build`] - Run a build pass and write the generated module
//! - [`check`] - Validate configuration and resolve modules

pub mod build;
pub mod check;

pub use build::execute as build_execute;
pub use check::execute as check_execute;

use std::path::Path;

use tack_config::{ConfigDiscovery, ConfigError, ProjectConfig, load_file, validate_fs};

use crate::error::{CliError, Result, ResultExt};

/// Load the project configuration from `path`, or discover it in the current directory.
///
/// Build settings are validated against the filesystem before returning.
pub(crate) fn load_project(path: Option<&Path>) -> Result<ProjectConfig> {
    let project = match path {
        Some(path) => {
            if !path.is_file() {
                return Err(CliError::FileNotFound(path.to_path_buf()));
            }
            load_file(path)?
        }
        None => {
            let cwd = std::env::current_dir()?;
            match ConfigDiscovery::new(&cwd).load() {
                Err(ConfigError::NotFound) => {
                    return Err(CliError::Config(ConfigError::NotFound)).with_hint(
                        "Create a tack.toml, tack.json or a \"tack\" field in package.json, or pass --config <path>",
                    );
                }
                other => other?,
            }
        }
    };

    validate_fs(&project.build)?;
    Ok(project)
}
