//! Configuration models and file loading.
//!
//! This crate owns the Reverie config schema, validation, and the json5
//! file loader used by binaries and the SDK.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// File loading and default path helpers.
pub use loader::{default_config_path, default_data_dir, load_config};
/// Configuration schema models.
pub use model::*;
