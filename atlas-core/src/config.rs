//! Client configuration management.
//!
//! Handles loading, saving, and validating the API credentials and logging
//! preferences used to construct a client. Configuration is persisted as
//! TOML on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{AtlasError, AtlasResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// API connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as `Authorization: Key <api_key>`.
    #[serde(default)]
    pub api_key: String,

    /// Name identifying this client. Tags created measurements and is
    /// appended to the User-Agent.
    #[serde(default)]
    pub client_name: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, logs go to the console only.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output for the log file.
    #[serde(default)]
    pub json_output: bool,
}

fn default_base_url() -> String {
    constants::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            client_name: String::new(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl ApiConfig {
    /// Build a config for the public API root with the given credentials.
    pub fn new(client_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Per-request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that the credentials needed to construct a client are present.
    pub fn validate(&self) -> AtlasResult<()> {
        if self.client_name.trim().is_empty() {
            return Err(AtlasError::MissingConfig("api.client_name".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(AtlasError::MissingConfig("api.api_key".into()));
        }
        if self.timeout_ms == 0 {
            return Err(AtlasError::Config("api.timeout_ms must be positive".into()));
        }
        if AppConfig::sanitize_base_url(&self.base_url).is_empty() {
            return Err(AtlasError::MissingConfig("api.base_url".into()));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from the default config file path, falling back to
    /// defaults when no file exists.
    pub fn load_default() -> AtlasResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> AtlasResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> AtlasResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AtlasError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> AtlasResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| AtlasError::Config("could not determine config directory".into()))?;
        Ok(base.join(constants::CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Get the log directory, if file logging is configured.
    pub fn log_dir(&self) -> Option<PathBuf> {
        if self.logging.directory.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.logging.directory))
        }
    }

    /// Normalize an API root: strip whitespace, quotes, and trailing slashes.
    pub fn sanitize_base_url(url: &str) -> String {
        url.trim()
            .trim_matches('"')
            .trim()
            .trim_end_matches('/')
            .to_string()
    }
}
