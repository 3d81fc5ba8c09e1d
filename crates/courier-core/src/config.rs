//! Configuration model.
//!
//! Mirrors `~/.config/courier/config.toml`. Loading and environment
//! overrides live in `courier-infrastructure`.

use crate::error::{CourierError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/docs-web/api";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_INITIAL_LOAD_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_LOAD_RETRY_SECS: u64 = 2;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RootConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl RootConfig {
    /// Checks values that would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(CourierError::config("server.base_url must not be empty"));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(CourierError::config(
                "server.request_timeout_secs must be greater than 0",
            ));
        }
        self.session.validate()
    }
}

/// Connection to the document server.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// Base URL of the REST API, e.g. `https://docs.example.com/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `auth_token` cookie obtained by the application shell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Username of the viewer; when unset it is looked up from the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            viewer: None,
        }
    }
}

/// Polling and first-load policy of a messaging session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Total number of fetch attempts before `start` gives up
    #[serde(default = "default_initial_load_attempts")]
    pub initial_load_attempts: u32,
    #[serde(default = "default_initial_load_retry_secs")]
    pub initial_load_retry_secs: u64,
}

impl SessionSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn initial_load_retry_delay(&self) -> Duration {
        Duration::from_secs(self.initial_load_retry_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(CourierError::config(
                "session.poll_interval_secs must be greater than 0",
            ));
        }
        if self.initial_load_attempts == 0 {
            return Err(CourierError::config(
                "session.initial_load_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            initial_load_attempts: DEFAULT_INITIAL_LOAD_ATTEMPTS,
            initial_load_retry_secs: DEFAULT_INITIAL_LOAD_RETRY_SECS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_initial_load_attempts() -> u32 {
    DEFAULT_INITIAL_LOAD_ATTEMPTS
}

fn default_initial_load_retry_secs() -> u64 {
    DEFAULT_INITIAL_LOAD_RETRY_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}
