//! Application configuration.

use cryptowatch_alerts::{
    ConfigError as EngineConfigError, EngineConfig, Locale, NOTIFICATION_COOLDOWN_MS,
    THRESHOLD_PERCENT,
};
use cryptowatch_feeds::CoinGeckoConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] EngineConfigError),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scheduler settings.
    pub poll: PollSettings,
    /// Alert engine settings.
    pub engine: EngineSettings,
    /// Price feed settings.
    pub feed: FeedSettings,
    /// HTTP API settings.
    pub http: HttpSettings,
    /// Notification language.
    pub locale: Locale,
    /// Logging level.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll: PollSettings::default(),
            engine: EngineSettings::default(),
            feed: FeedSettings::default(),
            http: HttpSettings::default(),
            locale: Locale::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings the engine depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EngineConfig::from(&self.engine).validate()?;
        Ok(())
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Whether the background poll loop runs.
    pub enabled: bool,
    /// Seconds between poll cycles.
    pub interval_secs: u64,
    /// Asset ids polled every cycle.
    pub coins: Vec<String>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 20,
            coins: vec!["bitcoin".to_string(), "ethereum".to_string()],
        }
    }
}

/// Alert engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Minimum absolute 1h change in percent.
    pub threshold_percent: f64,
    /// Cooldown between notifications in milliseconds.
    pub cooldown_ms: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            threshold_percent: THRESHOLD_PERCENT,
            cooldown_ms: NOTIFICATION_COOLDOWN_MS,
        }
    }
}

impl From<&EngineSettings> for EngineConfig {
    fn from(settings: &EngineSettings) -> Self {
        EngineConfig {
            threshold_percent: settings.threshold_percent,
            cooldown_ms: settings.cooldown_ms,
        }
    }
}

/// Price feed settings. The API key is read from the environment, not from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub base_url: String,
    pub vs_currency: String,
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        let defaults = CoinGeckoConfig::default();
        Self {
            base_url: defaults.base_url,
            vs_currency: defaults.vs_currency,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

impl FeedSettings {
    pub fn to_client_config(&self, api_key: Option<String>) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.base_url.clone(),
            vs_currency: self.vs_currency.clone(),
            api_key,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub port: u16,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { port: 3000 }
    }
}
