//! Resolved module descriptors.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The role a module plays in the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// A top-level application with its own route.
    App,
    /// Contributes pages to the settings area.
    Settings,
    /// Fills an extension slot in another module.
    Plugin,
    /// Reacts to application events without UI of its own.
    Handler,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::App,
        ModuleKind::Settings,
        ModuleKind::Plugin,
        ModuleKind::Handler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::App => "app",
            ModuleKind::Settings => "settings",
            ModuleKind::Plugin => "plugin",
            ModuleKind::Handler => "handler",
        }
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!("unknown module type '{s}' (expected one of: app, settings, plugin, handler)")
            })
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured view of one enabled module, produced by the resolver.
///
/// Serialized field names are camelCase because the descriptor ends up inside
/// the generated JavaScript module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Package name as enabled in the configuration.
    pub module: String,

    /// Installation directory the module was resolved to.
    pub location: PathBuf,

    /// Declared module type.
    #[serde(rename = "type")]
    pub kind: ModuleKind,

    /// Every type the module registers as, starting with `kind`.
    pub acts_as: Vec<ModuleKind>,

    /// Route paths the module exposes.
    pub routes: Vec<String>,

    /// Settings page paths the module contributes.
    pub settings_pages: Vec<String>,

    /// Manifest metadata with per-module options applied on top.
    pub metadata: Map<String, Value>,
}

impl ModuleDescriptor {
    /// Whether the module registers as `kind`, either directly or via `actsAs`.
    pub fn acts_as(&self, kind: ModuleKind) -> bool {
        self.acts_as.contains(&kind)
    }

    /// Human-readable name, falling back to the package name.
    pub fn display_name(&self) -> &str {
        self.metadata
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or(&self.module)
    }
}
