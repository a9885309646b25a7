//! Client configuration.
//!
//! Configuration is loaded from:
//! - a TOML file (`$CORPORA_CONFIG`, else ~/.config/corpora/client.toml)
//! - environment variables (`CORPORA_*`), which override the file
//!
//! ```toml
//! [client]
//! api_root = "https://corpus.example.com/api"
//! timeout_secs = 30
//! category_source = "catalog"
//! refresh_delay_ms = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use corpora_core::defaults;
use corpora_core::CategorySource;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for corpora_core::Error {
    fn from(e: ConfigError) -> Self {
        corpora_core::Error::Config(e.to_string())
    }
}

/// Settings for talking to the corpus service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root every endpoint path is appended to.
    #[serde(default = "ClientConfig::default_api_root")]
    pub api_root: String,
    /// Per-request timeout in seconds.
    #[serde(default = "ClientConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Endpoint that feeds the category directory.
    #[serde(default)]
    pub category_source: CategorySource,
    /// Delay before the refresh that follows a category deletion.
    #[serde(default = "ClientConfig::default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_root: Self::default_api_root(),
            timeout_secs: Self::default_timeout_secs(),
            category_source: CategorySource::default(),
            refresh_delay_ms: Self::default_refresh_delay_ms(),
        }
    }
}

impl ClientConfig {
    fn default_api_root() -> String {
        defaults::API_ROOT.to_string()
    }

    fn default_timeout_secs() -> u64 {
        defaults::TIMEOUT_SECS
    }

    fn default_refresh_delay_ms() -> u64 {
        defaults::REFRESH_DELAY_MS
    }

    /// Get the default config file path.
    ///
    /// Returns: ~/.config/corpora/client.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("corpora");
        path.push("client.toml");
        path
    }

    /// Load from the configured file (if any), then apply environment overrides.
    pub fn load() -> ConfigResult<Self> {
        let path = env::var(defaults::ENV_CONFIG)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_config_path());

        let base = if path.exists() {
            info!("Loading client config from: {}", path.display());
            Self::from_file(&path)?
        } else {
            debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            Self::default()
        };

        let config = base.with_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text with a `[client]` table.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            client: Option<ClientConfig>,
        }

        let root: TomlRoot = toml::from_str(content)?;
        let config = root.client.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Apply `CORPORA_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(defaults::ENV_API_ROOT) {
            self.api_root = root;
        }

        if let Some(raw) = lookup(defaults::ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{} must be a number of seconds, got: {}",
                    defaults::ENV_TIMEOUT_SECS,
                    raw
                ))
            })?;
        }

        if let Some(raw) = lookup(defaults::ENV_CATEGORY_SOURCE) {
            self.category_source = raw
                .parse()
                .map_err(|e: corpora_core::Error| ConfigError::Validation(e.to_string()))?;
        }

        if let Some(raw) = lookup(defaults::ENV_REFRESH_DELAY_MS) {
            self.refresh_delay_ms = raw.parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{} must be a number of milliseconds, got: {}",
                    defaults::ENV_REFRESH_DELAY_MS,
                    raw
                ))
            })?;
        }

        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_root.is_empty() {
            return Err(ConfigError::Validation(
                "api_root cannot be empty".to_string(),
            ));
        }

        if !self.api_root.starts_with("http://") && !self.api_root.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api_root must start with http:// or https://, got: {}",
                self.api_root
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}
