pub mod config;
pub mod discovery;
pub mod error;
pub mod validation;

// Re-export main types
pub use config::*;
pub use error::*;

// Re-export discovery and validation
pub use discovery::{CONFIG_FILE_NAMES, ConfigDiscovery, discover, load_file};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
