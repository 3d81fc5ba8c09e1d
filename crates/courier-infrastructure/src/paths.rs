//! Unified path management for courier configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/courier/           # Config directory (platform config dir)
//! └── config.toml              # Client configuration
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for courier_core::CourierError {
    fn from(err: PathError) -> Self {
        courier_core::CourierError::config(err.to_string())
    }
}

/// Path resolution for courier.
pub struct CourierPaths;

impl CourierPaths {
    const APP_DIR: &'static str = "courier";

    /// Returns the courier configuration directory (e.g. `~/.config/courier/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
