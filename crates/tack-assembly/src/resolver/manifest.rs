//! Module manifest parsing.
//!
//! A module declares its capabilities in the `tack` section of its
//! `package.json`:
//!
//! ```json
//! {
//!   "name": "@folio/users",
//!   "version": "9.1.0",
//!   "tack": {
//!     "type": "app",
//!     "actsAs": ["app", "settings"],
//!     "displayName": "Users",
//!     "route": "/users",
//!     "settings": ["/settings/users"]
//!   }
//! }
//! ```
//!
//! Any section field not listed here is kept as metadata.

use std::path::Path;

use serde_json::{Map, Value};

use crate::descriptor::{ModuleDescriptor, ModuleKind};
use crate::error::{Error, Result};

/// Manifest file name inside a module's installation directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Section of the manifest holding module capabilities.
pub const MANIFEST_SECTION: &str = "tack";

const RESERVED_KEYS: [&str; 5] = ["type", "actsAs", "route", "routes", "settings"];

/// The parts of a `package.json` the resolver cares about.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub section: Map<String, Value>,
}

impl PackageManifest {
    /// Parse manifest text for `module`.
    ///
    /// # Errors
    ///
    /// Invalid JSON, a missing or non-object `tack` section, or non-string
    /// package fields are reported as resolution errors naming `module`.
    pub fn parse(module: &str, content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::resolution(module, format!("invalid {MANIFEST_FILE}: {e}")))?;

        let Value::Object(mut root) = value else {
            return Err(Error::resolution(
                module,
                format!("{MANIFEST_FILE} is not a JSON object"),
            ));
        };

        let section = match root.shift_remove(MANIFEST_SECTION) {
            Some(Value::Object(section)) => section,
            Some(_) => {
                return Err(Error::resolution(
                    module,
                    format!("\"{MANIFEST_SECTION}\" section of {MANIFEST_FILE} must be an object"),
                ));
            }
            None => {
                return Err(Error::resolution(
                    module,
                    format!("{MANIFEST_FILE} has no \"{MANIFEST_SECTION}\" section"),
                ));
            }
        };

        Ok(Self {
            name: optional_string(module, &root, "name")?,
            version: optional_string(module, &root, "version")?,
            description: optional_string(module, &root, "description")?,
            section,
        })
    }

    /// Build the descriptor for `module` installed at `location`.
    ///
    /// `options` are the module's enable options from the configuration; they
    /// override manifest metadata key by key.
    pub fn into_descriptor(
        self,
        module: &str,
        location: &Path,
        options: &Value,
    ) -> Result<ModuleDescriptor> {
        let section = &self.section;

        let kind = match section.get("type") {
            Some(Value::String(kind)) => kind
                .parse::<ModuleKind>()
                .map_err(|reason| Error::resolution(module, reason))?,
            Some(_) => return Err(Error::resolution(module, "\"type\" must be a string")),
            None => return Err(Error::resolution(module, "manifest declares no \"type\"")),
        };

        let mut acts_as = vec![kind];
        for declared in string_list(module, section, "actsAs")? {
            let declared = declared
                .parse::<ModuleKind>()
                .map_err(|reason| Error::resolution(module, reason))?;
            if !acts_as.contains(&declared) {
                acts_as.push(declared);
            }
        }

        let mut routes = string_list(module, section, "route")?;
        for route in string_list(module, section, "routes")? {
            if !routes.contains(&route) {
                routes.push(route);
            }
        }
        if let Some(bad) = routes.iter().find(|r| !r.starts_with('/')) {
            return Err(Error::resolution(
                module,
                format!("route '{bad}' must start with '/'"),
            ));
        }
        if acts_as.contains(&ModuleKind::App) && routes.is_empty() {
            return Err(Error::resolution(
                module,
                "app modules must declare a \"route\"",
            ));
        }

        let mut settings_pages = string_list(module, section, "settings")?;
        if acts_as.contains(&ModuleKind::Settings) && settings_pages.is_empty() {
            settings_pages.push(default_settings_page(module, routes.first()));
        }

        let mut metadata = Map::new();
        if let Some(version) = &self.version {
            metadata.insert("version".to_string(), Value::String(version.clone()));
        }
        if let Some(description) = &self.description {
            metadata.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        for (key, value) in section {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                metadata.insert(key.clone(), value.clone());
            }
        }

        match options {
            Value::Null => {}
            Value::Object(overrides) => {
                for (key, value) in overrides {
                    metadata.insert(key.clone(), value.clone());
                }
            }
            _ => {
                return Err(Error::resolution(
                    module,
                    "module options must be an object",
                ));
            }
        }

        if let Some(name) = &self.name {
            if name != module {
                tracing::warn!(
                    module,
                    package = %name,
                    "package name differs from the enabled module name"
                );
            }
        }

        Ok(ModuleDescriptor {
            module: module.to_string(),
            location: location.to_path_buf(),
            kind,
            acts_as,
            routes,
            settings_pages,
            metadata,
        })
    }
}

/// `/settings/<route>` for routed modules, `/settings/<short name>` otherwise.
fn default_settings_page(module: &str, route: Option<&String>) -> String {
    match route {
        Some(route) => format!("/settings{route}"),
        None => {
            let short = module.rsplit('/').next().unwrap_or(module);
            let short = short.strip_prefix("ui-").unwrap_or(short);
            format!("/settings/{short}")
        }
    }
}

fn optional_string(module: &str, map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::resolution(
            module,
            format!("\"{key}\" in {MANIFEST_FILE} must be a string"),
        )),
    }
}

/// Accepts a single string or an array of strings.
fn string_list(module: &str, map: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::resolution(module, format!("\"{key}\" must only contain strings"))
                })
            })
            .collect(),
        Some(_) => Err(Error::resolution(
            module,
            format!("\"{key}\" must be a string or an array of strings"),
        )),
    }
}
