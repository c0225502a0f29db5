//! Configuration loading and management

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Server and viewer settings, stored as `config.json` in the config dir
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Artifactory host, without the `/artifactory` suffix
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Repository key followed by the folder to browse
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Directory served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Change polling period in seconds (default: 1 hour)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout for upstream and proxy requests in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_upstream_base_url() -> String {
    "https://artifactory.persgroep.cloud".to_string()
}

fn default_repository() -> String {
    "advertising-libraries-ext/be/persgroep/advertising/mobileadvertising-banner-advertising"
        .to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_poll_interval() -> u64 {
    3600 // 1 hour
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_base_url: default_upstream_base_url(),
            repository: default_repository(),
            static_dir: default_static_dir(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("upstream_base_url must start with http:// or https://, got {0:?}")]
    InvalidUpstream(String),

    #[error("repository must not be empty")]
    EmptyRepository,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

impl Config {
    /// Load configuration from the config directory, writing the defaults
    /// there on first run
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join("config.json");

        let config = if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)
                .with_context(|| format!("Failed to read config file: {:?}", config_file))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| "Failed to parse config.json")?;
            tracing::info!("Loaded configuration from {:?}", config_file);
            config
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_file
            );
            let config = Config::default();

            std::fs::create_dir_all(config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;

            // Write default config for reference
            let content = serde_json::to_string_pretty(&config)?;
            std::fs::write(&config_file, content)
                .with_context(|| format!("Failed to write default config: {:?}", config_file))?;
            tracing::info!("Created default config at {:?}", config_file);

            config
        };

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", config_file))?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(self.upstream_base_url.starts_with("http://")
            || self.upstream_base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidUpstream(self.upstream_base_url.clone()));
        }
        if self.repository.trim_matches('/').is_empty() {
            return Err(ConfigError::EmptyRepository);
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("poll_interval_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("request_timeout_secs"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `<platform config dir>/artifactory-viewer`, or `./.artifactory-viewer`
/// when the platform has none
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("artifactory-viewer"))
        .unwrap_or_else(|| PathBuf::from(".artifactory-viewer"))
}
