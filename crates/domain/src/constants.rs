//! Application constants
//!
//! Centralized location for domain-level policy constants and
//! configuration defaults.

// Incident ingestion policy: an incident has already happened, so its
// probability is pinned at the top of the scale.
pub const INCIDENT_RISK_IMPACT: i32 = 4;
pub const INCIDENT_RISK_PROBABILITY: i32 = 5;

// Engine defaults
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SINK_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_TRIGGER_QUEUE_CAPACITY: usize = 8;

// Storage defaults
pub const DEFAULT_DB_PATH: &str = "riskwatch.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Recorded error messages are clipped to keep metrics snapshots small
pub const MAX_RECORDED_ERROR_LENGTH: usize = 512;
