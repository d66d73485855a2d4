use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use url::Url;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Compress responses; avatar responses then carry no Content-Length
    #[serde(default = "default_enable_gzip")]
    pub enable_gzip: bool,
}

/// Avatar provider, fetch pool and cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// When false every lookup is answered with the placeholder
    #[serde(default = "default_avatar_enabled")]
    pub enabled: bool,
    /// Provider base URL; the hash is appended directly, so it must end in '/'
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Number of fetch workers, also the capacity of the task queue
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Timeout applied to each upstream HTTP call
    #[serde(default = "default_client_timeout", with = "duration")]
    pub client_timeout: Duration,
    /// How long a caller waits for its fetch before falling back
    #[serde(default = "default_wait_timeout", with = "duration")]
    pub wait_timeout: Duration,
    /// Age after which a cached avatar is refetched
    #[serde(default = "default_refresh_interval", with = "duration")]
    pub refresh_interval: Duration,
    /// Age after which a cached avatar is evicted
    #[serde(default = "default_cache_ttl", with = "duration")]
    pub cache_ttl: Duration,
    /// Period of the background eviction sweep
    #[serde(default = "default_cache_sweep_interval", with = "duration")]
    pub cache_sweep_interval: Duration,
    /// Local image served whenever an avatar cannot be resolved
    #[serde(default = "default_placeholder_path")]
    pub placeholder_path: PathBuf,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_enable_gzip() -> bool {
    DEFAULT_ENABLE_GZIP
}

// Avatar defaults
fn default_avatar_enabled() -> bool {
    DEFAULT_AVATAR_ENABLED
}

fn default_base_url() -> String {
    DEFAULT_AVATAR_BASE_URL.to_string()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_client_timeout() -> Duration {
    DEFAULT_CLIENT_TIMEOUT
}

fn default_wait_timeout() -> Duration {
    DEFAULT_WAIT_TIMEOUT
}

fn default_refresh_interval() -> Duration {
    DEFAULT_REFRESH_INTERVAL
}

fn default_cache_ttl() -> Duration {
    DEFAULT_CACHE_TTL
}

fn default_cache_sweep_interval() -> Duration {
    DEFAULT_CACHE_SWEEP_INTERVAL
}

fn default_placeholder_path() -> PathBuf {
    PathBuf::from(DEFAULT_PLACEHOLDER_PATH)
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_gzip: default_enable_gzip(),
        }
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: default_avatar_enabled(),
            base_url: default_base_url(),
            workers: default_workers(),
            client_timeout: default_client_timeout(),
            wait_timeout: default_wait_timeout(),
            refresh_interval: default_refresh_interval(),
            cache_ttl: default_cache_ttl(),
            cache_sweep_interval: default_cache_sweep_interval(),
            placeholder_path: default_placeholder_path(),
        }
    }
}

impl AvatarConfig {
    /// Validate pool sizing, timeouts and the provider URL
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("avatar.workers must be greater than zero".to_string());
        }

        let durations = [
            ("client_timeout", self.client_timeout),
            ("wait_timeout", self.wait_timeout),
            ("refresh_interval", self.refresh_interval),
            ("cache_ttl", self.cache_ttl),
            ("cache_sweep_interval", self.cache_sweep_interval),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(format!("avatar.{name} must be greater than zero"));
            }
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("avatar.base_url '{}' is not a valid URL: {e}", self.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "avatar.base_url must use http or https, got '{}'",
                url.scheme()
            ));
        }
        if !self.base_url.ends_with('/') {
            return Err(format!(
                "avatar.base_url '{}' must end with '/'",
                self.base_url
            ));
        }

        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.avatar
            .validate()
            .map_err(|message| anyhow::anyhow!("Invalid configuration: {message}"))
    }
}
