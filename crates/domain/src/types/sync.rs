//! Synchronization health, engine state and pass summaries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::utils::duration_millis;

/// Lifecycle state of the incident sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// Constructed, or waiting for the next tick.
    Idle,
    /// A sync pass is executing.
    Syncing,
    /// Terminal; reached only through cancellation.
    Stopped,
}

impl_domain_status_conversions!(EngineState {
    Idle => "idle",
    Syncing => "syncing",
    Stopped => "stopped",
});

/// Counts produced by one successful sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    /// Source fetch attempts used, including the successful one.
    pub attempts: u32,
    pub fetched: usize,
    /// Risks newly created by the sink.
    pub ingested: usize,
    /// Ingest decisions the sink already had a risk for.
    pub duplicates: usize,
    pub ignored: usize,
    pub sink_failures: usize,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

/// Point-in-time copy of synchronization health.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetrics {
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub failed_syncs: u64,
    /// Completion time of the last successful pass.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Empty when no pass has failed yet.
    pub last_error: String,
    pub last_error_time: Option<DateTime<Utc>>,
    pub incidents_fetched: u64,
    pub risks_ingested: u64,
    pub incidents_ignored: u64,
    pub sink_failures: u64,
    pub last_pass_duration_ms: u64,
}

impl SyncMetrics {
    /// Fraction of completed passes that succeeded, `None` before any pass.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_syncs == 0 {
            return None;
        }
        Some(self.successful_syncs as f64 / self.total_syncs as f64)
    }
}
