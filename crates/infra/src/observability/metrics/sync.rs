//! Synchronization health register
//!
//! ## Design
//! - **Single lock** over the whole [`SyncMetrics`] value: a pass outcome is
//!   applied as one unit, so a snapshot never observes `last_error` without
//!   its matching `last_error_time`, or a bumped `total_syncs` without the
//!   matching success/failure counter.
//! - **Copy-out reads**: [`SyncMetricsRegister::snapshot`] clones under the
//!   lock and releases it immediately.

use chrono::Utc;
use parking_lot::Mutex;
use riskwatch_domain::constants::MAX_RECORDED_ERROR_LENGTH;
use riskwatch_domain::{PassSummary, RiskWatchError, SyncMetrics};

/// Concurrency-safe store of [`SyncMetrics`].
#[derive(Debug, Default)]
pub struct SyncMetricsRegister {
    inner: Mutex<SyncMetrics>,
}

impl SyncMetricsRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pass whose fetch succeeded.
    pub fn record_success(&self, summary: &PassSummary) {
        let now = Utc::now();
        let mut metrics = self.inner.lock();

        metrics.total_syncs += 1;
        metrics.successful_syncs += 1;
        metrics.last_sync_time = Some(now);
        metrics.incidents_fetched += summary.fetched as u64;
        metrics.risks_ingested += summary.ingested as u64;
        metrics.incidents_ignored += summary.ignored as u64;
        metrics.sink_failures += summary.sink_failures as u64;
        metrics.last_pass_duration_ms = duration_ms(summary.duration);
    }

    /// Record a pass whose fetch retries were exhausted.
    pub fn record_failure(&self, error: &RiskWatchError) {
        let message = clip(error.to_string());
        let now = Utc::now();
        let mut metrics = self.inner.lock();

        metrics.total_syncs += 1;
        metrics.failed_syncs += 1;
        metrics.last_error = message;
        metrics.last_error_time = Some(now);
    }

    /// Copy of the current metrics.
    pub fn snapshot(&self) -> SyncMetrics {
        self.inner.lock().clone()
    }
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn clip(mut message: String) -> String {
    if message.len() > MAX_RECORDED_ERROR_LENGTH {
        let mut end = MAX_RECORDED_ERROR_LENGTH;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}
