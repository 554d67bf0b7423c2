//! Tests for configuration validation.

use std::fs;
use std::path::PathBuf;

use tack_config::{BuildSettings, ConfigError, ConfigValidator, FsValidator};
use tempfile::TempDir;

fn anchored(dir: &TempDir) -> BuildSettings {
    BuildSettings::default().anchored(dir.path())
}

#[test]
fn validate_catches_missing_alias_target() {
    let dir = TempDir::new().expect("tempdir");
    let mut settings = anchored(&dir);
    settings
        .alias
        .insert("@folio/users".to_string(), PathBuf::from("ui-users"));

    match FsValidator.validate(&settings).unwrap_err() {
        ConfigError::AliasTargetNotFound { alias, path } => {
            assert_eq!(alias, "@folio/users");
            assert!(path.ends_with("ui-users"));
        }
        other => panic!("expected AliasTargetNotFound error, got {other:?}"),
    }
}

#[test]
fn validate_succeeds_when_alias_target_exists() {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir(dir.path().join("ui-users")).expect("create module dir");

    let mut settings = anchored(&dir);
    settings
        .alias
        .insert("@folio/users".to_string(), PathBuf::from("ui-users"));

    assert!(FsValidator.validate(&settings).is_ok());
}

#[test]
fn validate_catches_missing_translations_dir() {
    let dir = TempDir::new().expect("tempdir");
    let settings = BuildSettings {
        translations_dir: Some(PathBuf::from("translations")),
        ..Default::default()
    }
    .anchored(dir.path());

    assert!(matches!(
        FsValidator.validate(&settings).unwrap_err(),
        ConfigError::TranslationsDirNotFound { .. }
    ));
}

#[test]
fn validate_runs_schema_checks_first() {
    let dir = TempDir::new().expect("tempdir");
    let mut settings = anchored(&dir);
    settings.alias.insert(String::new(), PathBuf::from("x"));

    assert!(matches!(
        FsValidator.validate(&settings).unwrap_err(),
        ConfigError::SchemaValidation { .. }
    ));
}
