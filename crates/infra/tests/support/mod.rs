//! Shared helpers for `riskwatch-infra` integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use riskwatch_core::{IncidentSource, IncidentSyncService, RiskSink};
use riskwatch_domain::{EngineConfig, Incident, Result as DomainResult, RiskWatchError, Severity};
use riskwatch_infra::IncidentSyncEngine;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once; `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Engine settings with short backoff and a generous shutdown bound.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        max_retries: 2,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_secs(1),
        sync_interval: Duration::from_secs(300),
        shutdown_timeout: Duration::from_secs(30),
        ..EngineConfig::default()
    }
}

pub fn build_engine<S, K>(source: Arc<S>, sink: Arc<K>, config: EngineConfig) -> IncidentSyncEngine
where
    S: IncidentSource + 'static,
    K: RiskSink + 'static,
{
    init_tracing();
    let service = IncidentSyncService::from_config(source, sink, &config);
    IncidentSyncEngine::new(service, config)
}

pub fn incident(external_id: &str, severity: Severity) -> Incident {
    Incident::new(external_id, format!("Incident {external_id}"), severity, "sentinel")
}

/// Source that records call counts and how many fetches ever overlapped.
pub struct ProbeSource {
    incidents: Vec<Incident>,
    fail_first: usize,
    always_fail: bool,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ProbeSource {
    pub fn returning(incidents: Vec<Incident>) -> Self {
        Self {
            incidents,
            fail_first: 0,
            always_fail: false,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self { always_fail: true, ..Self::returning(Vec::new()) }
    }

    /// Fail the first `failures` fetches, then succeed.
    pub fn failing_first(mut self, failures: usize) -> Self {
        self.fail_first = failures;
        self
    }

    /// Make every fetch take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IncidentSource for ProbeSource {
    async fn fetch_recent_incidents(&self) -> DomainResult<Vec<Incident>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.always_fail || call < self.fail_first {
            return Err(RiskWatchError::Source(format!("feed unavailable (call {})", call + 1)));
        }
        Ok(self.incidents.clone())
    }
}
