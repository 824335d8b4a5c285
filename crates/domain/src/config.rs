//! Configuration structures
//!
//! All durations serialize as milliseconds. Every section has defaults so a
//! partial file only needs to name the values it overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::{Result, RiskWatchError};
use crate::utils::duration_millis;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.database.validate()
    }
}

/// Incident sync engine configuration, immutable once the engine is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Retries after the first failed fetch; a pass makes at most
    /// `max_retries + 1` fetch attempts.
    pub max_retries: u32,
    #[serde(with = "duration_millis")]
    pub initial_backoff: Duration,
    #[serde(with = "duration_millis")]
    pub max_backoff: Duration,
    #[serde(with = "duration_millis")]
    pub sync_interval: Duration,
    /// Bound on a single fetch attempt; expiry counts as a failed attempt.
    #[serde(with = "duration_millis")]
    pub fetch_timeout: Duration,
    /// Bound on a single sink call; expiry counts as a per-incident failure.
    #[serde(with = "duration_millis")]
    pub sink_timeout: Duration,
    /// How long `stop()` waits for the background task to finish.
    #[serde(with = "duration_millis")]
    pub shutdown_timeout: Duration,
    /// Manual triggers that may wait for a free pass slot.
    pub trigger_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            sink_timeout: Duration::from_secs(DEFAULT_SINK_TIMEOUT_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            trigger_queue_capacity: DEFAULT_TRIGGER_QUEUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `RiskWatchError::Config` naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.max_backoff < self.initial_backoff {
            return Err(RiskWatchError::Config(format!(
                "max_backoff ({:?}) must not be shorter than initial_backoff ({:?})",
                self.max_backoff, self.initial_backoff
            )));
        }
        if self.sync_interval.is_zero() {
            return Err(RiskWatchError::Config("sync_interval must be greater than zero".into()));
        }
        if self.fetch_timeout.is_zero() || self.sink_timeout.is_zero() {
            return Err(RiskWatchError::Config("operation timeouts must be greater than zero".into()));
        }
        if self.trigger_queue_capacity == 0 {
            return Err(RiskWatchError::Config(
                "trigger_queue_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Risk store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(RiskWatchError::Config("database path must not be empty".into()));
        }
        if self.pool_size == 0 {
            return Err(RiskWatchError::Config("database pool_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Incident source configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSON snapshot file the daemon reads incidents from.
    pub snapshot_path: Option<PathBuf>,
}
