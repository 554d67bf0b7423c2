//! Build stages and their phase contexts.
//!
//! A build pass has two phases. During [`BuildPhase::Setup`] every stage
//! computes what it can on its own and registers what it provides. During
//! [`BuildPhase::Compose`] stages may read what other stages registered. The
//! driver finishes every setup before the first compose, so a stage never has
//! to wait for a collaborator.

use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::registry::StageRegistry;
use crate::resolver::AliasTable;
use crate::virtual_modules::VirtualModules;

/// Where a build pass currently is.
///
/// Phases are ordered; a pass only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildPhase {
    /// Nothing has run yet.
    Idle = 0,

    /// Stages compute independent results and register providers.
    Setup = 10,

    /// Stages combine collaborator results.
    Compose = 20,

    /// Every stage composed successfully.
    Done = 30,
}

impl BuildPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPhase::Idle => "idle",
            BuildPhase::Setup => "setup",
            BuildPhase::Compose => "compose",
            BuildPhase::Done => "done",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One participant in a build pass.
pub trait BuildStage: Send {
    /// Stable name used in logs and errors.
    fn name(&self) -> &str;

    /// Compute independent results and register providers.
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()>;

    /// Combine collaborator results. Called again on every rebuild.
    fn compose(&mut self, ctx: &ComposeContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// What a stage can see and change during setup.
pub struct SetupContext<'a> {
    base_path: &'a Path,
    aliases: &'a AliasTable,
    registry: &'a mut StageRegistry,
    virtual_modules: &'a VirtualModules,
}

impl<'a> SetupContext<'a> {
    pub fn new(
        base_path: &'a Path,
        aliases: &'a AliasTable,
        registry: &'a mut StageRegistry,
        virtual_modules: &'a VirtualModules,
    ) -> Self {
        Self {
            base_path,
            aliases,
            registry,
            virtual_modules,
        }
    }

    /// Directory module resolution starts from.
    pub fn base_path(&self) -> &Path {
        self.base_path
    }

    pub fn aliases(&self) -> &AliasTable {
        self.aliases
    }

    pub fn registry(&self) -> &StageRegistry {
        self.registry
    }

    /// Registry handle for announcing providers.
    pub fn registry_mut(&mut self) -> &mut StageRegistry {
        self.registry
    }

    pub fn virtual_modules(&self) -> &VirtualModules {
        self.virtual_modules
    }
}

/// What a stage can see during composition. The registry is read-only.
pub struct ComposeContext<'a> {
    registry: &'a StageRegistry,
    virtual_modules: &'a VirtualModules,
}

impl<'a> ComposeContext<'a> {
    pub fn new(registry: &'a StageRegistry, virtual_modules: &'a VirtualModules) -> Self {
        Self {
            registry,
            virtual_modules,
        }
    }

    pub fn registry(&self) -> &StageRegistry {
        self.registry
    }

    pub fn virtual_modules(&self) -> &VirtualModules {
        self.virtual_modules
    }
}
