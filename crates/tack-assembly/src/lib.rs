#![cfg_attr(docsrs, feature(doc_cfg))]

//! # tack-assembly
//!
//! Build-time assembly of the `tack-config` module.
//!
//! A build pass is a list of [`BuildStage`]s run by a [`BuildDriver`]: every
//! stage's setup first, then every stage's composition. The
//! [`ConfigAssemblyPlugin`] resolves the enabled modules during setup and,
//! once the translation and branding stages have registered their results,
//! writes a virtual module exporting `okapi`, `config`, `modules`, `branding`
//! and `translations`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tack_assembly::{
//!     BrandingStage, BuildDriver, ConfigAssemblyPlugin, TranslationStage, VIRTUAL_MODULE_ID,
//! };
//! use serde_json::json;
//!
//! # fn main() -> tack_assembly::Result<()> {
//! let plugin = ConfigAssemblyPlugin::from_value(json!({
//!     "okapi": { "url": "http://localhost:9130", "tenant": "diku" },
//!     "config": { "logCategories": "core" },
//!     "modules": { "@folio/users": {} }
//! }))?;
//!
//! let mut driver = BuildDriver::new("./platform")
//!     .with_stage(TranslationStage::from_dir("./translations", "/translations"))
//!     .with_stage(BrandingStage::new(json!({ "logo": { "alt": "Tack" } })))
//!     .with_stage(plugin);
//! driver.run()?;
//!
//! let text = driver.virtual_modules().read(VIRTUAL_MODULE_ID);
//! # let _ = text;
//! # Ok(()) }
//! ```
//!
//! ## Logging
//!
//! Library code only emits `tracing` events. The `logging` feature adds the
//! stderr subscriber the `tack` binary installs (`logging::install`).

pub mod descriptor;
pub mod driver;
pub mod error;
pub mod fs;
pub mod plugin;
pub mod registry;
pub mod resolver;
pub mod serialize;
pub mod stage;
pub mod stages;
pub mod virtual_modules;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

pub use descriptor::{ModuleDescriptor, ModuleKind};
pub use driver::BuildDriver;
pub use error::{Error, Result};
pub use fs::{FileSystem, NativeFs};
pub use plugin::{
    AssemblyState, ConfigAssemblyPlugin, EXPORTED_BINDINGS, PendingConfiguration,
    VIRTUAL_MODULE_ID, VIRTUAL_MODULE_SPECIFIER, render_artifact,
};
pub use registry::{BrandingProvider, StageRegistry, StageRole, TranslationProvider, Translations};
pub use resolver::{AliasTable, ManifestResolver, ModuleDescriptors, ModuleResolver};
pub use serialize::{JsSerializer, Serializer};
pub use stage::{BuildPhase, BuildStage, ComposeContext, SetupContext};
pub use stages::{BrandingStage, TranslationStage};
pub use virtual_modules::VirtualModules;

#[cfg(any(test, feature = "test-utils"))]
pub use fs::MemoryFs;
