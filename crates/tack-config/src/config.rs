//! High-level configuration structure for tack.
//!
//! A project configuration file holds two things side by side: the application
//! configuration that ends up in the generated `tack-config` module (`okapi`,
//! `config`, `modules`, `branding`, plus any passthrough keys), and a `build`
//! table describing how the build should locate modules and translations.
//!
//! The application half is parsed directly so that declaration order of
//! `modules` survives; the `build` half goes through figment so it can be
//! overridden from the environment.
//!
//! For file discovery, see the `discovery` module.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Key of the build table inside a project configuration file.
pub const BUILD_KEY: &str = "build";

/// Environment prefix for build setting overrides (`TACK_BUILD_BASE_PATH=...`).
pub const ENV_PREFIX: &str = "TACK_BUILD_";

/// Default public path prefix for compiled translation bundles.
pub const DEFAULT_TRANSLATIONS_PUBLIC_PATH: &str = "/translations";

/// Application configuration exactly as the user wrote it.
///
/// The shape is deliberately loose: `modules` is not validated here because the
/// assembly plugin owns that check and reports it as a build-configuration error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfiguration(Map<String, Value>);

impl RawConfiguration {
    /// Create from a `serde_json::Value`, which must be an object.
    ///
    /// # Example
    ///
    /// ```
    /// use tack_config::RawConfiguration;
    /// use serde_json::json;
    ///
    /// let raw = RawConfiguration::from_value(json!({
    ///     "okapi": { "url": "http://localhost:9130" },
    ///     "modules": { "@folio/users": {} }
    /// }))
    /// .unwrap();
    /// assert!(raw.modules().is_some());
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConfigError::InvalidValue {
                field: "config".to_string(),
                hint: Some(format!("expected an object, found {}", kind_of(&other))),
            }),
        }
    }

    pub fn okapi(&self) -> Option<&Value> {
        self.0.get("okapi")
    }

    pub fn config(&self) -> Option<&Value> {
        self.0.get("config")
    }

    pub fn modules(&self) -> Option<&Value> {
        self.0.get("modules")
    }

    pub fn branding(&self) -> Option<&Value> {
        self.0.get("branding")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Returns a copy with `key` removed.
    pub fn without(&self, key: &str) -> Self {
        let mut map = self.0.clone();
        map.shift_remove(key);
        Self(map)
    }
}

impl From<Map<String, Value>> for RawConfiguration {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<RawConfiguration> for Value {
    fn from(raw: RawConfiguration) -> Self {
        Value::Object(raw.0)
    }
}

/// Settings the build system hands to the assembly stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Directory module resolution starts from. Relative values are taken
    /// from the directory holding the config file.
    pub base_path: Option<PathBuf>,

    /// Module name to installation directory overrides.
    pub alias: IndexMap<String, PathBuf>,

    /// Directory holding compiled `<locale>.json` translation bundles.
    pub translations_dir: Option<PathBuf>,

    /// URL prefix under which translation bundles are served.
    pub translations_public_path: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            base_path: None,
            alias: IndexMap::new(),
            translations_dir: None,
            translations_public_path: DEFAULT_TRANSLATIONS_PUBLIC_PATH.to_string(),
        }
    }
}

impl BuildSettings {
    /// Anchor relative paths to `root`.
    pub fn anchored(mut self, root: &Path) -> Self {
        let base = match self.base_path.take() {
            Some(path) if path.is_absolute() => path,
            Some(path) => root.join(path),
            None => root.to_path_buf(),
        };
        self.translations_dir = self.translations_dir.map(|dir| {
            if dir.is_absolute() {
                dir
            } else {
                base.join(dir)
            }
        });
        self.base_path = Some(base);
        self
    }

    /// The resolution base path, falling back to `.` when unanchored.
    pub fn base_path(&self) -> &Path {
        self.base_path.as_deref().unwrap_or_else(|| Path::new("."))
    }
}

/// Fully loaded project configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    /// Application configuration destined for the generated module.
    pub app: RawConfiguration,

    /// Build-system settings.
    pub build: BuildSettings,
}

impl ProjectConfig {
    /// Create from a `serde_json::Value` (for programmatic config from DB/API).
    ///
    /// The `build` table is split off and layered with `TACK_BUILD_*`
    /// environment overrides; everything else becomes the application config.
    ///
    /// # Example
    ///
    /// ```
    /// use tack_config::ProjectConfig;
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "modules": { "@folio/users": {} },
    ///     "build": { "alias": { "@folio/users": "../ui-users" } }
    /// });
    ///
    /// let config = ProjectConfig::from_value(value).unwrap();
    /// assert!(config.app.modules().is_some());
    /// assert!(!config.app.contains_key("build"));
    /// assert_eq!(config.build.alias.len(), 1);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "config".to_string(),
                    hint: Some(format!("expected an object, found {}", kind_of(&other))),
                });
            }
        };

        let build_value = map.shift_remove(BUILD_KEY).unwrap_or(Value::Null);
        let build = extract_build_settings(build_value)?;

        Ok(Self {
            app: RawConfiguration(map),
            build,
        })
    }

    /// Anchor relative build paths to the directory holding the config file.
    pub fn anchored(mut self, root: &Path) -> Self {
        self.build = self.build.anchored(root);
        self
    }
}

/// Merge defaults, the file's build table, and environment overrides.
fn extract_build_settings(build_value: Value) -> Result<BuildSettings> {
    let mut figment = Figment::new().merge(Serialized::defaults(BuildSettings::default()));

    match build_value {
        Value::Null => {}
        Value::Object(_) => {
            figment = figment.merge(Serialized::defaults(build_value));
        }
        other => {
            return Err(ConfigError::InvalidValue {
                field: BUILD_KEY.to_string(),
                hint: Some(format!("expected a table, found {}", kind_of(&other))),
            });
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    figment.extract().map_err(|e| ConfigError::InvalidValue {
        field: BUILD_KEY.to_string(),
        hint: Some(e.to_string()),
    })
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
