//! Configuration: logging settings and declared models.
//!
//! Models come from the `[models]` table of the config file and from model
//! files in `models_dir`.

pub mod loader;
pub mod models;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path, load_model_files};
pub use types::{ConfigFile, Declared, FieldDecl, LoggingConfig, ModelDecl, ResolvedConfig};
