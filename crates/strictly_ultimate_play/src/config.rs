//! Match configuration loaded from TOML.

use crate::error::ConfigError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ServiceConfig::base_url`].
pub const SERVICE_URL_ENV: &str = "STRICTLY_ULTIMATE_SERVICE_URL";

/// Which strategy controls player O.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OpponentKind {
    /// Both sides are submitted by the caller.
    None,
    /// Uniformly random legal moves.
    #[default]
    Random,
    /// Moves recommended by the learning service, random on failure.
    Remote,
}

impl OpponentKind {
    /// True when player O is driven by a strategy.
    pub fn is_enabled(self) -> bool {
        self != OpponentKind::None
    }
}

/// Learning-service endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the service, without trailing slash.
    #[serde(default = "default_base_url")]
    base_url: String,

    /// Upper bound on any single request.
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,

    /// Report finished matches for training when playing the remote opponent.
    #[serde(default = "default_training")]
    training: bool,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_training() -> bool {
    true
}

impl ServiceConfig {
    /// Creates service settings for `base_url` with default timeout and training on.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms: default_timeout_ms(),
            training: default_training(),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enables or disables training reports.
    pub fn with_training(mut self, training: bool) -> Self {
        self.training = training;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

/// Configuration for one match runtime.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PlayConfig {
    /// Strategy controlling player O.
    #[serde(default)]
    opponent: OpponentKind,

    /// Pause before the opponent moves.
    #[serde(default = "default_thinking_delay_ms")]
    thinking_delay_ms: u64,

    /// Pause between placing a mark and resolving it.
    #[serde(default = "default_mark_delay_ms")]
    mark_delay_ms: u64,

    /// Seed for the random strategy; entropy when absent.
    #[serde(default)]
    seed: Option<u64>,

    /// Learning-service settings.
    #[serde(default)]
    service: ServiceConfig,
}

fn default_thinking_delay_ms() -> u64 {
    1000
}

fn default_mark_delay_ms() -> u64 {
    500
}

impl PlayConfig {
    /// Creates a configuration with default pacing and service settings.
    pub fn new(opponent: OpponentKind) -> Self {
        Self {
            opponent,
            thinking_delay_ms: default_thinking_delay_ms(),
            mark_delay_ms: default_mark_delay_ms(),
            seed: None,
            service: ServiceConfig::default(),
        }
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(opponent = %config.opponent, "Config loaded successfully");
        Ok(config)
    }

    /// Applies [`SERVICE_URL_ENV`] if it is set.
    #[instrument(skip(self))]
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            debug!(%url, "Service URL overridden from environment");
            self.service.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Opponent thinking delay.
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    /// Mark placement delay.
    pub fn mark_delay(&self) -> Duration {
        Duration::from_millis(self.mark_delay_ms)
    }

    /// Sets the opponent strategy.
    pub fn with_opponent(mut self, opponent: OpponentKind) -> Self {
        self.opponent = opponent;
        self
    }

    /// Sets both pacing delays.
    pub fn with_pacing(mut self, thinking: Duration, mark: Duration) -> Self {
        self.thinking_delay_ms = u64::try_from(thinking.as_millis()).unwrap_or(u64::MAX);
        self.mark_delay_ms = u64::try_from(mark.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the random strategy seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the service settings.
    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.service = service;
        self
    }
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self::new(OpponentKind::default())
    }
}
