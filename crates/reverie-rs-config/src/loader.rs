//! Config file loading.

use crate::error::ConfigError;
use crate::model::ReverieConfig;
use directories::ProjectDirs;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Load config from an explicit path, or from the default location.
///
/// An explicit path must exist and parse. The default path is optional:
/// when absent, the built-in defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<ReverieConfig, ConfigError> {
    let config = match path {
        Some(path) => read_config_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => ReverieConfig::default(),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Read and parse one config file.
fn read_config_file(path: &Path) -> Result<ReverieConfig, ConfigError> {
    debug!("loading config (path={})", path.display());
    let contents = fs::read_to_string(path)?;
    let config: ReverieConfig = json5::from_str(&contents)?;
    Ok(config)
}

/// Default config path under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "reverie").map(|dirs| dirs.config_dir().join("config.json"))
}

/// Default store directory under the platform data directory.
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "reverie").map(|dirs| dirs.data_dir().join("memory"))
}
