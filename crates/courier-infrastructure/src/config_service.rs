//! Configuration service implementation.
//!
//! Loads the root configuration from `~/.config/courier/config.toml` and
//! applies environment overrides on top of it.
//!
//! Priority: environment variables > config file > built-in defaults.

use crate::paths::CourierPaths;
use courier_core::config::RootConfig;
use courier_core::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_URL: &str = "COURIER_URL";
pub const ENV_AUTH_TOKEN: &str = "COURIER_AUTH_TOKEN";
pub const ENV_VIEWER: &str = "COURIER_VIEWER";
pub const ENV_LOG: &str = "COURIER_LOG";

/// Configuration service bound to one config file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Creates a service for the default config file location.
    pub fn new_default() -> Result<Self> {
        Ok(Self::with_path(CourierPaths::config_file()?))
    }

    /// Creates a service for an explicit config file (tests, `--config`).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration with process environment overrides applied.
    pub fn load(&self) -> Result<RootConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Loads the configuration, resolving overrides through `env`.
    pub fn load_with_env<F>(&self, env: F) -> Result<RootConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;
        apply_env_overrides(&mut config, env);
        config.validate()?;
        Ok(config)
    }

    /// Reads the config file only. A missing or empty file yields defaults.
    pub fn load_file(&self) -> Result<RootConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] No config file at {:?}, using defaults",
                self.path
            );
            return Ok(RootConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(RootConfig::default());
        }

        let config: RootConfig = toml::from_str(&content)?;
        tracing::debug!("[ConfigService] Loaded config from {:?}", self.path);
        Ok(config)
    }

    /// Writes the configuration, creating the parent directory if needed.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(config)?;
        fs::write(&self.path, toml_string)?;
        tracing::info!("[ConfigService] Saved config to {:?}", self.path);
        Ok(())
    }

    /// Writes a default config file unless one already exists.
    ///
    /// Returns `true` when a file was created.
    pub fn ensure_config_file(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&RootConfig::default())?;
        Ok(true)
    }
}

/// Applies `COURIER_*` overrides. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut RootConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = lookup(ENV_URL) {
        config.server.base_url = url;
    }
    if let Some(token) = lookup(ENV_AUTH_TOKEN) {
        config.server.auth_token = Some(token);
    }
    if let Some(viewer) = lookup(ENV_VIEWER) {
        config.server.viewer = Some(viewer);
    }
    if let Some(level) = lookup(ENV_LOG) {
        config.logging.level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = service.load_with_env(no_env).unwrap();
        assert_eq!(config, RootConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("nested/config.toml"));

        let mut config = RootConfig::default();
        config.server.base_url = "https://docs.example.com/api".to_string();
        config.server.auth_token = Some("secret".to_string());
        config.session.poll_interval_secs = 30;
        service.save(&config).unwrap();

        let loaded = service.load_with_env(no_env).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
base_url = "https://file.example.com/api"
viewer = "alice"
"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_URL, "https://env.example.com/api"),
            (ENV_AUTH_TOKEN, "token-from-env"),
            (ENV_VIEWER, "  "),
        ]);
        let service = ConfigService::with_path(path);
        let config = service
            .load_with_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.base_url, "https://env.example.com/api");
        assert_eq!(config.server.auth_token.as_deref(), Some("token-from-env"));
        // Blank override is ignored
        assert_eq!(config.server.viewer.as_deref(), Some("alice"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[session]\npoll_interval_secs = 0\n").unwrap();

        let err = ConfigService::with_path(path)
            .load_with_env(no_env)
            .unwrap_err();
        assert!(matches!(err, courier_core::CourierError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[server\nbase_url = ").unwrap();

        let err = ConfigService::with_path(path).load_file().unwrap_err();
        assert!(matches!(
            err,
            courier_core::CourierError::Serialization { .. }
        ));
    }

    #[test]
    fn test_ensure_config_file_only_creates_once() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        assert!(service.ensure_config_file().unwrap());
        assert!(!service.ensure_config_file().unwrap());
        assert!(service.path().exists());
    }
}
