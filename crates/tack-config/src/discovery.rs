//! File-based config discovery for CLI use
//!
//! Handles finding and loading tack configuration files from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ProjectConfig;
use crate::error::{ConfigError, Result};

/// Conventional config file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["tack.toml", "tack.json"];

/// Field of `package.json` that may hold the configuration.
pub const PACKAGE_JSON_FIELD: &str = "tack";

/// File-based configuration discovery
///
/// Searches for tack configuration files in conventional locations and loads them.
/// This is primarily for CLI use - library users should use `ProjectConfig::from_value()` directly.
///
/// # Example
///
/// ```no_run
/// use tack_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. tack.toml
    /// 2. tack.json
    /// 3. package.json (tack field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let path = self.root.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed
                        .get(PACKAGE_JSON_FIELD)
                        .is_some_and(|field| !field.is_null())
                    {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<ProjectConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        load_file(&path)
    }
}

/// Load config from a specific file path.
///
/// Relative build paths are anchored to the file's directory.
pub fn load_file(path: &Path) -> Result<ProjectConfig> {
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let value = read_value(path)?;
    tracing::debug!(path = %path.display(), "loaded tack configuration");

    Ok(ProjectConfig::from_value(value)?.anchored(&root))
}

fn read_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    if file_name == "package.json" {
        return package_json_value(&content);
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            let table: toml::Table =
                toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                    field: "toml".to_string(),
                    hint: Some(format!("Invalid TOML syntax: {}", e)),
                })?;

            serde_json::to_value(table).map_err(|e| ConfigError::InvalidValue {
                field: "toml".to_string(),
                hint: Some(format!("TOML to JSON conversion failed: {}", e)),
            })
        }
        Some("json") => serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            field: "json".to_string(),
            hint: Some(format!("Invalid JSON: {}", e)),
        }),
        Some(other) => Err(ConfigError::UnsupportedFormat(other.to_string())),
        None => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

fn package_json_value(content: &str) -> Result<Value> {
    let mut parsed: Value = serde_json::from_str(content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {}", e)),
    })?;

    let field = parsed
        .get_mut(PACKAGE_JSON_FIELD)
        .map(Value::take)
        .ok_or_else(|| ConfigError::InvalidValue {
            field: PACKAGE_JSON_FIELD.to_string(),
            hint: Some("Add a 'tack' field to your package.json".to_string()),
        })?;

    if field.is_null() {
        return Err(ConfigError::InvalidValue {
            field: PACKAGE_JSON_FIELD.to_string(),
            hint: Some("The 'tack' field cannot be null".to_string()),
        });
    }

    Ok(field)
}

/// Discover and load config from current directory (convenience function)
///
/// # Example
///
/// ```no_run
/// use tack_config::discover;
///
/// let config = discover().unwrap();
/// ```
pub fn discover() -> Result<ProjectConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}
