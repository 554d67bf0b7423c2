//! Error types for the assembly pipeline.
//!
//! Every variant is fatal for the current build pass. Nothing here is retried;
//! the driver stops at the first error and no artifact is written.

use miette::Diagnostic;
use thiserror::Error;

use crate::registry::StageRole;
use crate::stage::BuildPhase;

/// Error types for tack-assembly operations.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The raw configuration handed to the assembly plugin has the wrong shape.
    #[error("tack-config was not provided a valid \"{field}\" object: {reason}")]
    #[diagnostic(
        code(tack::config_shape),
        help("Add a `{field}` table mapping module names to their options")
    )]
    ConfigShape { field: String, reason: String },

    /// An enabled module could not be located or its manifest is malformed.
    #[error("failed to resolve module '{module}': {reason}")]
    #[diagnostic(
        code(tack::module_resolution),
        help("Install the module, add a `build.alias` entry for it, or fix its package.json `tack` section")
    )]
    ModuleResolution { module: String, reason: String },

    /// A collaborator stage was not registered before composition.
    #[error("no {role} stage is registered")]
    #[diagnostic(
        code(tack::missing_collaborator),
        help("Register the {role} stage with the build driver before running the build")
    )]
    MissingCollaborator { role: StageRole },

    /// Two stages tried to fill the same collaborator role.
    #[error("stages '{first}' and '{second}' both provide {role}")]
    #[diagnostic(
        code(tack::duplicate_collaborator),
        help("Register exactly one {role} stage per build")
    )]
    DuplicateCollaborator {
        role: StageRole,
        first: String,
        second: String,
    },

    /// A value in the merged configuration could not be turned into source text.
    #[error("failed to serialize {what}: {reason}")]
    #[diagnostic(code(tack::serialization))]
    Serialization { what: String, reason: String },

    /// A stage was driven out of order.
    #[error("stage '{stage}' expected phase {expected} but was in {actual}")]
    #[diagnostic(
        code(tack::phase),
        help("All setup calls must complete before composition begins")
    )]
    Phase {
        stage: String,
        expected: BuildPhase,
        actual: BuildPhase,
    },

    /// Invalid virtual module path, unregistered write, or oversize content.
    #[error("virtual module error: {0}")]
    #[diagnostic(code(tack::virtual_module))]
    VirtualModule(String),

    /// Configuration loading error.
    #[error(transparent)]
    #[diagnostic(code(tack::config))]
    Config(#[from] tack_config::ConfigError),
}

/// Result type alias for tack-assembly operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn resolution(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ModuleResolution {
            module: module.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn serialization(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::Serialization {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}
