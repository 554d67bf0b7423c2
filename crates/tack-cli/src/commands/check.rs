//! Check command implementation.
//!
//! Validates configuration and resolves every enabled module without
//! composing or writing anything.

use serde_json::Value;
use tack_assembly::stages::scan_translations_dir;
use tack_assembly::{ConfigAssemblyPlugin, ManifestResolver, ModuleResolver};

use crate::cli::CheckArgs;
use crate::commands::load_project;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load the configuration and validate build settings against the filesystem
/// 2. Check the shape of `modules`
/// 3. Resolve every enabled module
/// 4. Count translation bundles when a translations directory is configured
///
/// # Errors
///
/// Returns the first failure; nothing is written either way.
pub fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");
    let project = load_project(args.config.as_deref())?;
    let plugin = ConfigAssemblyPlugin::new(project.app)?;
    ui::success("Configuration is valid");

    let enabled = plugin
        .options()
        .modules()
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    ui::info(&format!("Resolving {} module(s)...", enabled.len()));
    let modules = ManifestResolver::default().resolve(
        &enabled,
        project.build.base_path(),
        &project.build.alias,
    )?;
    ui::print_module_summary(&modules);

    if let Some(dir) = &project.build.translations_dir {
        let translations = scan_translations_dir(dir, &project.build.translations_public_path)?;
        ui::info(&format!(
            "{} translation bundle(s) in {}",
            translations.len(),
            dir.display()
        ));
    }

    ui::success("All checks passed!");
    Ok(())
}
