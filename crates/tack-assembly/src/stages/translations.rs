//! Translation stage.
//!
//! Provides the locale map: locale code to the URL of its compiled bundle.
//! The map is either fixed up front or built from a directory of
//! `<locale>.json` bundles during setup.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tack_config::ConfigError;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::registry::{TranslationProvider, Translations};
use crate::stage::{BuildStage, SetupContext};

pub const TRANSLATION_STAGE_NAME: &str = "translations";

#[derive(Debug, Clone)]
enum Source {
    Fixed(Translations),
    Directory { dir: PathBuf, public_path: String },
}

/// Computes the locale map and provides it to the assembly stage.
///
/// Clones share the computed map, so a handle kept outside the driver can
/// replace it between rebuilds with [`TranslationStage::set`].
#[derive(Debug, Clone)]
pub struct TranslationStage {
    source: Source,
    map: Arc<RwLock<Translations>>,
}

impl TranslationStage {
    /// Use a fixed locale map.
    pub fn from_map(map: Translations) -> Self {
        Self {
            source: Source::Fixed(map),
            map: Arc::default(),
        }
    }

    /// Scan `dir` for `<locale>.json` bundles served under `public_path`.
    pub fn from_dir(dir: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        Self {
            source: Source::Directory {
                dir: dir.into(),
                public_path: public_path.into(),
            },
            map: Arc::default(),
        }
    }

    /// Replace the provided map. Takes effect on the next composition.
    pub fn set(&self, map: Translations) {
        *self.map.write() = map;
    }

    /// Current locale map.
    pub fn snapshot(&self) -> Translations {
        self.map.read().clone()
    }
}

struct SharedTranslations(Arc<RwLock<Translations>>);

impl TranslationProvider for SharedTranslations {
    fn translations(&self) -> Translations {
        self.0.read().clone()
    }
}

impl BuildStage for TranslationStage {
    fn name(&self) -> &str {
        TRANSLATION_STAGE_NAME
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let map = match &self.source {
            Source::Fixed(map) => map.clone(),
            Source::Directory { dir, public_path } => scan_translations_dir(dir, public_path)?,
        };
        tracing::debug!(locales = map.len(), "translations ready");
        self.set(map);

        ctx.registry_mut().register_translations(
            TRANSLATION_STAGE_NAME,
            Arc::new(SharedTranslations(Arc::clone(&self.map))),
        )
    }
}

/// Build a locale map from the `*.json` files directly inside `dir`.
///
/// Locales are ordered by file name.
///
/// # Errors
///
/// Returns a configuration error if `dir` is not a directory or cannot be read.
pub fn scan_translations_dir(dir: &Path, public_path: &str) -> Result<Translations> {
    if !dir.is_dir() {
        return Err(ConfigError::TranslationsDirNotFound {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let prefix = public_path.trim_end_matches('/');
    let mut map = Translations::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::from(ConfigError::Io(io::Error::from(e))))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let (Some(locale), Some(file_name)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.file_name().and_then(|s| s.to_str()),
        ) else {
            tracing::warn!(path = %path.display(), "skipping translation file with non UTF-8 name");
            continue;
        };

        map.insert(locale.to_string(), format!("{prefix}/{file_name}"));
    }

    Ok(map)
}
