//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! The result is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `RISKWATCH_DB_PATH`: Database file path
//! - `RISKWATCH_SYNC_INTERVAL_SECS`: Seconds between scheduled sync passes
//!
//! Optional (defaults apply when unset):
//! - `RISKWATCH_DB_POOL_SIZE`: Connection pool size
//! - `RISKWATCH_MAX_RETRIES`: Fetch retries per pass
//! - `RISKWATCH_INITIAL_BACKOFF_MS`: First retry delay in milliseconds
//! - `RISKWATCH_MAX_BACKOFF_MS`: Retry delay ceiling in milliseconds
//! - `RISKWATCH_FETCH_TIMEOUT_SECS`: Bound on a single fetch attempt
//! - `RISKWATCH_SINK_TIMEOUT_SECS`: Bound on a single risk store call
//! - `RISKWATCH_SHUTDOWN_TIMEOUT_SECS`: How long `stop()` waits for the engine
//! - `RISKWATCH_TRIGGER_QUEUE_CAPACITY`: Manual triggers that may queue
//! - `RISKWATCH_SNAPSHOT_PATH`: JSON incident snapshot file
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./riskwatch.{json,toml}` or `./config.{json,toml}` (current directory)
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use riskwatch_domain::{Config, DatabaseConfig, EngineConfig, Result, RiskWatchError, SourceConfig};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `RiskWatchError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded values fail validation
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `RiskWatchError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("RISKWATCH_DB_PATH")?;
    let sync_interval_secs: u64 =
        parse_env("RISKWATCH_SYNC_INTERVAL_SECS", &env_var("RISKWATCH_SYNC_INTERVAL_SECS")?)?;

    let defaults = EngineConfig::default();
    let engine = EngineConfig {
        max_retries: env_opt("RISKWATCH_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
        initial_backoff: env_opt("RISKWATCH_INITIAL_BACKOFF_MS")?
            .map_or(defaults.initial_backoff, Duration::from_millis),
        max_backoff: env_opt("RISKWATCH_MAX_BACKOFF_MS")?
            .map_or(defaults.max_backoff, Duration::from_millis),
        sync_interval: Duration::from_secs(sync_interval_secs),
        fetch_timeout: env_opt("RISKWATCH_FETCH_TIMEOUT_SECS")?
            .map_or(defaults.fetch_timeout, Duration::from_secs),
        sink_timeout: env_opt("RISKWATCH_SINK_TIMEOUT_SECS")?
            .map_or(defaults.sink_timeout, Duration::from_secs),
        shutdown_timeout: env_opt("RISKWATCH_SHUTDOWN_TIMEOUT_SECS")?
            .map_or(defaults.shutdown_timeout, Duration::from_secs),
        trigger_queue_capacity: env_opt("RISKWATCH_TRIGGER_QUEUE_CAPACITY")?
            .unwrap_or(defaults.trigger_queue_capacity),
    };

    let database = DatabaseConfig {
        path: db_path,
        pool_size: env_opt("RISKWATCH_DB_POOL_SIZE")?
            .unwrap_or_else(|| DatabaseConfig::default().pool_size),
    };

    let source = SourceConfig {
        snapshot_path: std::env::var_os("RISKWATCH_SNAPSHOT_PATH").map(PathBuf::from),
    };

    Ok(Config { engine, database, source })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RiskWatchError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RiskWatchError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RiskWatchError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RiskWatchError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `RiskWatchError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RiskWatchError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RiskWatchError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RiskWatchError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("riskwatch.json"),
        dir.join("riskwatch.toml"),
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `RiskWatchError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RiskWatchError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable, `Ok(None)` when unset.
fn env_opt<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_env(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| RiskWatchError::Config(format!("Invalid value for {key}: {e}")))
}
