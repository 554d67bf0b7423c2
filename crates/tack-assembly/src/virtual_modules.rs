//! Virtual module store
//!
//! Holds in-memory source files the host build treats as if they existed on
//! disk. A module is registered first, during setup, so the rest of the build
//! graph knows it exists; its content is written later, once composition has
//! everything it needs. Writing always replaces the whole file.
//!
//! ## Security
//!
//! - File size limits prevent memory exhaustion
//! - Path validation rejects null bytes, absolute paths and `..` segments

use std::path::{Component, Path};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Maximum size for a single virtual module (1MB)
///
/// Generated configuration modules are small; anything larger points at a
/// runaway serialization.
pub const MAX_VIRTUAL_MODULE_SIZE: usize = 1024 * 1024;

const MAX_ID_LEN: usize = 4096;

/// Shared store of virtual modules.
///
/// Cloning is cheap and every clone sees the same modules.
#[derive(Debug, Clone, Default)]
pub struct VirtualModules {
    /// Module ID to content; `None` until the first write.
    modules: Arc<RwLock<FxHashMap<String, Option<String>>>>,
}

impl VirtualModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` known to the build. Registering twice keeps existing content.
    ///
    /// # Errors
    ///
    /// Returns `Error::VirtualModule` for invalid module IDs.
    pub fn register(&self, id: &str) -> Result<()> {
        validate_module_id(id)?;
        self.modules.write().entry(id.to_string()).or_insert(None);
        tracing::debug!(id, "registered virtual module");
        Ok(())
    }

    /// Replace the content of a registered module.
    ///
    /// # Errors
    ///
    /// - `id` was never registered
    /// - content exceeds [`MAX_VIRTUAL_MODULE_SIZE`]
    pub fn write(&self, id: &str, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        validate_content_size(&content)?;

        let mut modules = self.modules.write();
        let slot = modules.get_mut(id).ok_or_else(|| {
            Error::VirtualModule(format!("cannot write '{id}': module was never registered"))
        })?;
        *slot = Some(content);
        Ok(())
    }

    /// Current content of `id`, if it has been written.
    pub fn read(&self, id: &str) -> Option<String> {
        self.modules.read().get(id).cloned().flatten()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.modules.read().contains_key(id)
    }

    /// Registered module IDs, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.modules.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Map an import specifier onto a registered module ID.
    ///
    /// Accepts the ID itself or a bare package specifier (`tack-config`) for a
    /// module registered as `node_modules/<specifier>.js`.
    pub fn resolve(&self, specifier: &str) -> Option<String> {
        let modules = self.modules.read();
        if modules.contains_key(specifier) {
            return Some(specifier.to_string());
        }

        let candidate = format!("node_modules/{specifier}.js");
        modules.contains_key(&candidate).then_some(candidate)
    }
}

/// Validates a module ID for security
fn validate_module_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::VirtualModule("module ID cannot be empty".to_string()));
    }

    // Reject null bytes (can cause issues in C FFI and filesystems)
    if id.contains('\0') {
        return Err(Error::VirtualModule(
            "module ID contains null byte".to_string(),
        ));
    }

    // Reject suspiciously long paths
    if id.len() > MAX_ID_LEN {
        return Err(Error::VirtualModule(format!(
            "module ID too long: {} bytes (max {MAX_ID_LEN})",
            id.len()
        )));
    }

    let escapes = Path::new(id)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::VirtualModule(format!(
            "module ID '{id}' must be a relative path without '..'"
        )));
    }

    Ok(())
}

/// Validates virtual module content size
fn validate_content_size(content: &str) -> Result<()> {
    if content.len() > MAX_VIRTUAL_MODULE_SIZE {
        return Err(Error::VirtualModule(format!(
            "content too large: {} bytes (max {MAX_VIRTUAL_MODULE_SIZE} bytes)",
            content.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_module_id_normal() {
        assert!(validate_module_id("node_modules/tack-config.js").is_ok());
        assert!(validate_module_id("./generated/index.js").is_ok());
    }

    #[test]
    fn test_validate_module_id_null_byte() {
        assert!(validate_module_id("file\0name.js").is_err());
    }

    #[test]
    fn test_validate_module_id_too_long() {
        let long_id = "a".repeat(5000);
        assert!(validate_module_id(&long_id).is_err());
    }

    #[test]
    fn test_validate_module_id_rejects_escapes() {
        assert!(validate_module_id("../outside.js").is_err());
        assert!(validate_module_id("/etc/passwd").is_err());
        assert!(validate_module_id("").is_err());
    }

    #[test]
    fn test_validate_content_size() {
        assert!(validate_content_size(&"a".repeat(1000)).is_ok());
        assert!(validate_content_size(&"a".repeat(MAX_VIRTUAL_MODULE_SIZE + 1)).is_err());
    }

    #[test]
    fn write_requires_registration() {
        let modules = VirtualModules::new();
        let err = modules.write("node_modules/x.js", "export {};").unwrap_err();
        assert!(err.to_string().contains("never registered"));
        assert!(modules.read("node_modules/x.js").is_none());
    }

    #[test]
    fn write_after_registration_replaces_content() {
        let modules = VirtualModules::new();
        modules.register("node_modules/x.js").unwrap();
        assert!(modules.is_registered("node_modules/x.js"));
        assert_eq!(modules.read("node_modules/x.js"), None);

        modules.write("node_modules/x.js", "first").unwrap();
        modules.write("node_modules/x.js", "second").unwrap();
        assert_eq!(modules.read("node_modules/x.js").as_deref(), Some("second"));
    }

    #[test]
    fn re_registering_keeps_content() {
        let modules = VirtualModules::new();
        modules.register("a.js").unwrap();
        modules.write("a.js", "kept").unwrap();
        modules.register("a.js").unwrap();
        assert_eq!(modules.read("a.js").as_deref(), Some("kept"));
    }

    #[test]
    fn clones_share_state() {
        let modules = VirtualModules::new();
        let other = modules.clone();
        modules.register("a.js").unwrap();
        other.write("a.js", "shared").unwrap();
        assert_eq!(modules.read("a.js").as_deref(), Some("shared"));
    }

    #[test]
    fn resolves_bare_specifiers() {
        let modules = VirtualModules::new();
        modules.register("node_modules/tack-config.js").unwrap();
        assert_eq!(
            modules.resolve("tack-config").as_deref(),
            Some("node_modules/tack-config.js")
        );
        assert_eq!(
            modules.resolve("node_modules/tack-config.js").as_deref(),
            Some("node_modules/tack-config.js")
        );
        assert_eq!(modules.resolve("react"), None);
    }
}
