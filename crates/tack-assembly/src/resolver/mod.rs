//! Module resolution for enabled modules.
//!
//! Turns the `modules` table of the configuration into resolved
//! [`ModuleDescriptor`]s:
//! 1. Look the module up in the alias table
//! 2. Otherwise walk up from the base path through `node_modules`
//! 3. Read the module's `package.json` and its `tack` section
//! 4. Apply the module's enable options on top of the manifest metadata
//!
//! Output order always follows the order modules were enabled in.

mod aliases;
mod manifest;

pub use aliases::resolve_alias;
pub use manifest::{MANIFEST_FILE, MANIFEST_SECTION, PackageManifest};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::descriptor::ModuleDescriptor;
use crate::error::{Error, Result};
use crate::fs::{FileSystem, NativeFs};

/// Module name to installation directory overrides, as configured for the build.
pub type AliasTable = IndexMap<String, PathBuf>;

/// Resolved descriptors keyed by module name, in enable order.
pub type ModuleDescriptors = IndexMap<String, ModuleDescriptor>;

/// Strategy for turning enabled modules into descriptors.
///
/// The assembly plugin depends on this trait rather than a concrete resolver
/// so tests and alternate build setups can supply their own.
pub trait ModuleResolver: Send + Sync {
    fn resolve(
        &self,
        enabled: &Map<String, Value>,
        base_path: &Path,
        aliases: &AliasTable,
    ) -> Result<ModuleDescriptors>;
}

/// Resolver that reads each module's `package.json` from a [`FileSystem`].
#[derive(Clone)]
pub struct ManifestResolver {
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for ManifestResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestResolver").finish_non_exhaustive()
    }
}

impl Default for ManifestResolver {
    fn default() -> Self {
        Self::new(NativeFs)
    }
}

impl ManifestResolver {
    /// Create a resolver reading from `fs`.
    pub fn new(fs: impl FileSystem + 'static) -> Self {
        Self { fs: Arc::new(fs) }
    }

    /// Find the installation directory of `module`.
    ///
    /// Alias targets must contain a manifest; a stale alias is reported rather
    /// than silently falling through to `node_modules`.
    pub fn locate(&self, module: &str, base_path: &Path, aliases: &AliasTable) -> Result<PathBuf> {
        if let Some(dir) = resolve_alias(module, base_path, aliases) {
            if self.fs.is_file(&dir.join(MANIFEST_FILE)) {
                return Ok(dir);
            }
            return Err(Error::resolution(
                module,
                format!(
                    "alias points to {} but no {MANIFEST_FILE} was found there",
                    dir.display()
                ),
            ));
        }

        self.find_in_node_modules(module, base_path)
            .ok_or_else(|| {
                Error::resolution(
                    module,
                    format!(
                        "not found in any node_modules directory above {}",
                        base_path.display()
                    ),
                )
            })
    }

    /// Node-style lookup: `<dir>/node_modules/<module>` for `base_path` and each ancestor.
    fn find_in_node_modules(&self, module: &str, base_path: &Path) -> Option<PathBuf> {
        base_path.ancestors().find_map(|dir| {
            let candidate = dir.join("node_modules").join(module);
            self.fs
                .is_file(&candidate.join(MANIFEST_FILE))
                .then_some(candidate)
        })
    }

    /// Resolve a single module.
    pub fn resolve_one(
        &self,
        module: &str,
        options: &Value,
        base_path: &Path,
        aliases: &AliasTable,
    ) -> Result<ModuleDescriptor> {
        if module.trim().is_empty() {
            return Err(Error::resolution(module, "module name cannot be empty"));
        }

        let location = self.locate(module, base_path, aliases)?;
        let manifest_path = location.join(MANIFEST_FILE);
        let content = self.fs.read_to_string(&manifest_path).map_err(|e| {
            Error::resolution(
                module,
                format!("failed to read {}: {e}", manifest_path.display()),
            )
        })?;

        let descriptor =
            PackageManifest::parse(module, &content)?.into_descriptor(module, &location, options)?;

        tracing::debug!(
            module,
            location = %descriptor.location.display(),
            kind = %descriptor.kind,
            routes = descriptor.routes.len(),
            "resolved module"
        );

        Ok(descriptor)
    }
}

impl ModuleResolver for ManifestResolver {
    fn resolve(
        &self,
        enabled: &Map<String, Value>,
        base_path: &Path,
        aliases: &AliasTable,
    ) -> Result<ModuleDescriptors> {
        let _span = tracing::debug_span!("resolve_modules", count = enabled.len()).entered();

        enabled
            .iter()
            .map(|(module, options)| {
                self.resolve_one(module, options, base_path, aliases)
                    .map(|descriptor| (module.clone(), descriptor))
            })
            .collect()
    }
}
