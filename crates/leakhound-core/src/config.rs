//! Configuration management for leakhound.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Command-line flags are applied on top by
//! the CLI.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Bucket;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/leakhound/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream index settings
    pub intelx: IntelxConfig,
    /// Per-document fetch retry policy
    pub retry: RetryConfig,
    /// Search and pacing behavior
    pub scanning: ScanningConfig,
    /// Output destination settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `LEAKHOUND_API_URL`: Override the upstream API root
    /// - `LEAKHOUND_REQUEST_DELAY_MS`: Override the delay between document fetches
    /// - `LEAKHOUND_MAX_RETRIES`: Override the fetch attempt ceiling
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("LEAKHOUND_API_URL") {
            if !val.trim().is_empty() {
                tracing::debug!("Override intelx.api_url from env: {}", val);
                self.intelx.api_url = val;
            }
        }

        if let Ok(val) = std::env::var("LEAKHOUND_REQUEST_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                self.scanning.request_delay_ms = ms;
                tracing::debug!("Override scanning.request_delay_ms from env: {}", ms);
            }
        }

        if let Ok(val) = std::env::var("LEAKHOUND_MAX_RETRIES") {
            if let Ok(attempts) = val.parse() {
                self.retry.max_attempts = attempts;
                tracing::debug!("Override retry.max_attempts from env: {}", attempts);
            }
        }

        self
    }

    /// Check values that would make a scan meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.retry.multiplier == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.multiplier".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scanning.buckets.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scanning.buckets".to_string(),
                reason: "at least one bucket is required".to_string(),
            });
        }
        if self.scanning.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_results".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/leakhound/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "leakhound", "leakhound").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Upstream index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntelxConfig {
    /// API root
    pub api_url: String,
    /// User agent string
    pub user_agent: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Server-side search timeout in seconds
    pub search_timeout_secs: u64,
    /// Delay between result polls in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum number of result polls per search
    pub max_polls: u32,
}

impl Default for IntelxConfig {
    fn default() -> Self {
        Self {
            api_url: "https://2.intelx.io".to_string(),
            user_agent: format!("leakhound/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            search_timeout_secs: 5,
            poll_interval_ms: 1000,
            max_polls: 60,
        }
    }
}

/// Fetch retry policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per document, including the first
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,
    /// Factor applied to the delay after each retry
    pub multiplier: u32,
}

impl RetryConfig {
    /// Delay before the first retry.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
            multiplier: 2,
        }
    }
}

/// Search and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Minimum delay between consecutive document fetches in milliseconds
    pub request_delay_ms: u64,
    /// Buckets queried for every search term
    pub buckets: Vec<Bucket>,
    /// Result cap per bucket/term combination
    pub max_results: u32,
    /// Lookback window in months
    pub range_months: u32,
    /// Also search for `@target`
    pub email_search: bool,
}

impl ScanningConfig {
    /// Minimum delay between consecutive document fetches.
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            buckets: Bucket::defaults(),
            max_results: 100,
            range_months: 6,
            email_search: false,
        }
    }
}

/// Output destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory all output files are placed in
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("out"),
        }
    }
}
