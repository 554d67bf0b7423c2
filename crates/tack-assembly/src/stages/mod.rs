//! Reference collaborator stages.
//!
//! Minimal producers for the two roles the assembly stage consumes. Real
//! builds can swap either for a stage that compiles translations or fetches
//! branding assets; all the assembly stage sees is the registered provider.

mod branding;
mod translations;

pub use branding::{BRANDING_STAGE_NAME, BrandingStage};
pub use translations::{TRANSLATION_STAGE_NAME, TranslationStage, scan_translations_dir};
