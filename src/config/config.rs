//! Config file handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::{Result, SpecdeckError};
use crate::openapi::document::DEFAULT_RELAY_URL;
use crate::openapi::model::Credentials;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "SPECDECK_CONFIG_DIR";

pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// specdeck configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    /// Replaces the base URL derived from the document
    pub base_url: Option<String>,
    /// Transport timeout
    pub timeout: Option<Duration>,
    /// Relay prefix for remote specs; an empty string disables the relay
    pub relay_url: Option<String>,
    /// Scheme name → credential
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
            base_url: None,
            timeout: None,
            relay_url: None,
            credentials: Credentials::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default config directory
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_dir())
    }

    /// Load `config.toml` from `config_dir`; a missing file yields defaults
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join(CONFIG_FILE_NAME);

        if !config_file.exists() {
            debug!(path = %config_file.display(), "No config file");
            return Ok(Self { config_dir: config_dir.to_path_buf(), ..Self::default() });
        }

        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| SpecdeckError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&content, config_dir)
    }

    /// Parse config TOML text
    pub fn parse(content: &str, config_dir: &Path) -> Result<Self> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| SpecdeckError::Config(format!("Invalid config TOML: {}", e)))?;

        let defaults = toml_value.get("defaults");
        let string_default = |key: &str| -> Option<String> {
            let value = defaults?.get(key)?;
            match value.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    warn!(key, "Ignoring non-string config value");
                    None
                }
            }
        };

        let timeout = defaults.and_then(|d| d.get("timeout")).and_then(|v| {
            let timeout = v
                .as_float()
                .or_else(|| v.as_integer().map(|i| i as f64))
                .and_then(timeout_from_secs);
            if timeout.is_none() {
                warn!(value = %v, "Ignoring invalid timeout");
            }
            timeout
        });

        let credentials: Credentials = toml_value
            .get("credentials")
            .and_then(|c| c.as_table())
            .map(|table| {
                table
                    .iter()
                    .filter_map(|(scheme, value)| match value.as_str() {
                        Some(s) => Some((scheme.clone(), s.to_string())),
                        None => {
                            warn!(scheme = %scheme, "Ignoring non-string credential");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            config_dir: config_dir.to_path_buf(),
            base_url: string_default("base_url").filter(|s| !s.is_empty()),
            timeout,
            relay_url: string_default("relay_url"),
            credentials,
        })
    }

    /// Get the default config directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|p| p.join("specdeck"))
            .unwrap_or_else(|| PathBuf::from(".specdeck"))
    }

    /// Path of the config file
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Relay to use for remote specs, `None` when disabled
    pub fn effective_relay_url(&self) -> Option<String> {
        match self.relay_url.as_deref() {
            Some("") => None,
            Some(relay) => Some(relay.to_string()),
            None => Some(DEFAULT_RELAY_URL.to_string()),
        }
    }

    /// Transport timeout, 30 seconds unless configured
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Positive, finite seconds that fit a `Duration`
pub fn timeout_from_secs(secs: f64) -> Option<Duration> {
    if secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
