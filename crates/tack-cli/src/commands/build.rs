//! Build command implementation.
//!
//! Runs one build pass with three stages: translations, branding and the
//! configuration assembly stage. The generated module is written to `--out`
//! or printed to stdout.

use std::fs;
use std::time::Instant;

use serde_json::{Value, json};
use tack_assembly::{
    BrandingStage, BuildDriver, ConfigAssemblyPlugin, TranslationStage, Translations,
    VIRTUAL_MODULE_ID,
};
use tack_config::ProjectConfig;

use crate::cli::BuildArgs;
use crate::commands::load_project;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the build command.
///
/// # Errors
///
/// Returns errors for invalid configuration, unresolvable modules, a failed
/// composition, or an unwritable output file.
pub fn execute(args: BuildArgs) -> Result<()> {
    let start = Instant::now();

    let project = load_project(args.config.as_deref())?;
    let text = assemble(project)?;

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_path(parent)?;
            }
            fs::write(path, &text)
                .with_path(path)
                .context(format!("Failed to write {}", path.display()))?;
            ui::success(&format!(
                "Wrote {} ({}) in {}ms",
                path.display(),
                ui::format_size(text.len() as u64),
                start.elapsed().as_millis()
            ));
        }
        None => print!("{text}"),
    }

    Ok(())
}

/// Run a build pass for `project` and return the generated module text.
pub fn assemble(project: ProjectConfig) -> Result<String> {
    let branding = branding_or_empty(project.app.branding().cloned().unwrap_or(Value::Null));

    let translations = match &project.build.translations_dir {
        Some(dir) => TranslationStage::from_dir(dir, &project.build.translations_public_path),
        None => {
            ui::warning("No build.translations_dir configured; translations will be empty");
            TranslationStage::from_map(Translations::new())
        }
    };

    let plugin = ConfigAssemblyPlugin::new(project.app)?;
    let mut driver = BuildDriver::from_settings(&project.build)
        .with_stage(translations)
        .with_stage(BrandingStage::new(branding))
        .with_stage(plugin);

    driver.run()?;

    driver
        .virtual_modules()
        .read(VIRTUAL_MODULE_ID)
        .ok_or_else(|| CliError::Custom(format!("{VIRTUAL_MODULE_ID} was not generated")))
}

fn branding_or_empty(value: Value) -> Value {
    if value.is_null() { json!({}) } else { value }
}
