use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::engine::Source;

const MIN_INTERVAL_SECS: u64 = 10 * 60;
const MAX_INTERVAL_SECS: u64 = 12 * 60 * 60;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// One whitelist URL per entry, fetched in this order.
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    #[serde(default)]
    pub reload: ReloadConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReloadConfig {
    /// How long a cached copy is used before updates are pulled. 0 always refetches.
    #[serde(default = "default_cache_time")]
    pub cache_time_secs: u64,
    #[serde(default)]
    pub auto_reload: bool,
    #[serde(default = "default_reload_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsConfig {
    #[serde(default)]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_cache_dir() -> String {
    "cache".to_string()
}
fn default_cache_time() -> u64 {
    60 * 60 * 24
}
fn default_reload_interval() -> u64 {
    60 * 60
}
fn default_tick_interval() -> u64 {
    50
}
fn default_http_timeout() -> u64 {
    30_000
}
fn default_user_agent() -> String {
    "WhitelistSync/1.0".to_string()
}
fn default_max_body_bytes() -> u64 {
    16 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![],
            cache_dir: default_cache_dir(),
            reload: ReloadConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            cache_time_secs: default_cache_time(),
            auto_reload: false,
            interval_secs: default_reload_interval(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            log_interval_seconds: 0,
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config TOML")?;
        Ok(config)
    }

    pub fn sources(&self) -> Vec<Source> {
        self.sources.iter().map(|url| Source::new(url.as_str())).collect()
    }

    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.cache_dir)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.reload.cache_time_secs)
    }

    /// Reload interval clamped to 10 minutes ..= 12 hours.
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(
            self.reload
                .interval_secs
                .clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS),
        )
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.reload.tick_interval_ms.max(1))
    }

    /// Number of ticks the reload interval spans at the configured tick rate.
    pub fn reload_interval_ticks(&self) -> u64 {
        let tick_ms = self.tick_interval().as_millis() as u64;
        (self.reload_interval().as_millis() as u64 / tick_ms).max(1)
    }
}
