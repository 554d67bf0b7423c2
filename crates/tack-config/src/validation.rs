//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for library use).
//! Neither strategy looks at `modules`; the assembly plugin validates that field itself.

use crate::config::BuildSettings;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    /// Validate build settings
    fn validate(&self, settings: &BuildSettings) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use tack_config::{BuildSettings, SchemaValidator, ConfigValidator};
///
/// let mut settings = BuildSettings::default();
/// settings.alias.insert("@folio/users".into(), "../ui-users".into());
///
/// SchemaValidator.validate(&settings).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, settings: &BuildSettings) -> Result<()> {
        for (alias, target) in &settings.alias {
            if alias.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "alias names cannot be empty".to_string(),
                    hint: Some("Remove empty keys from the 'build.alias' table".to_string()),
                });
            }

            if target.as_os_str().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: format!("alias '{alias}' has an empty target"),
                    hint: Some("Point each alias at the module's directory".to_string()),
                });
            }
        }

        if !settings.translations_public_path.starts_with('/')
            && !settings.translations_public_path.contains("://")
        {
            return Err(ConfigError::SchemaValidation {
                message: format!(
                    "translations_public_path '{}' must be absolute or a URL",
                    settings.translations_public_path
                ),
                hint: Some("Use a value such as \"/translations\"".to_string()),
            });
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Validates that alias targets and the translations directory exist on disk.
/// Relative paths are checked against the settings' base path.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, settings: &BuildSettings) -> Result<()> {
        // First run schema validation
        SchemaValidator.validate(settings)?;

        let base = settings.base_path();

        for (alias, target) in &settings.alias {
            let path = base.join(target);
            if !path.exists() {
                return Err(ConfigError::AliasTargetNotFound {
                    alias: alias.clone(),
                    path,
                });
            }
        }

        if let Some(dir) = &settings.translations_dir {
            let path = base.join(dir);
            if !path.is_dir() {
                return Err(ConfigError::TranslationsDirNotFound { path });
            }
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(settings: &BuildSettings) -> Result<()> {
    SchemaValidator.validate(settings)
}

/// Convenience function for filesystem validation
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tack_config::{BuildSettings, validate_fs};
///
/// let settings = BuildSettings::default().anchored(Path::new("."));
/// validate_fs(&settings).unwrap();
/// ```
pub fn validate_fs(settings: &BuildSettings) -> Result<()> {
    FsValidator.validate(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn schema_validator_accepts_defaults() {
        assert!(SchemaValidator.validate(&BuildSettings::default()).is_ok());
    }

    #[test]
    fn schema_validator_rejects_empty_alias_name() {
        let mut settings = BuildSettings::default();
        settings.alias.insert("  ".to_string(), PathBuf::from("../ui-users"));
        let result = SchemaValidator.validate(&settings);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::SchemaValidation { .. }
        ));
    }

    #[test]
    fn schema_validator_rejects_empty_alias_target() {
        let mut settings = BuildSettings::default();
        settings.alias.insert("@folio/users".to_string(), PathBuf::new());
        let err = SchemaValidator.validate(&settings).unwrap_err();
        assert!(err.to_string().contains("@folio/users"));
    }

    #[test]
    fn schema_validator_rejects_relative_public_path() {
        let settings = BuildSettings {
            translations_public_path: "translations".to_string(),
            ..Default::default()
        };
        assert!(SchemaValidator.validate(&settings).is_err());
    }

    #[test]
    fn schema_validator_accepts_url_public_path() {
        let settings = BuildSettings {
            translations_public_path: "https://cdn.example.org/translations".to_string(),
            ..Default::default()
        };
        assert!(SchemaValidator.validate(&settings).is_ok());
    }
}
