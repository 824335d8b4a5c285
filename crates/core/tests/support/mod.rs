//! Shared test helpers for `riskwatch-core` integration tests.
//!
//! Lightweight scripted fakes for the incident source and risk sink ports so
//! tests can focus on behaviour instead of plumbing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use riskwatch_core::{CreateOutcome, IncidentSource, RiskSink};
use riskwatch_domain::{Incident, Result as DomainResult, Risk, RiskKey, RiskWatchError, Severity};

/// Source that replays a script of fetch results, then repeats a fallback.
pub struct ScriptedSource {
    script: Mutex<VecDeque<DomainResult<Vec<Incident>>>>,
    fallback: DomainResult<Vec<Incident>>,
    fetch_delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    /// Always returns `incidents`.
    pub fn returning(incidents: Vec<Incident>) -> Self {
        Self::scripted(Vec::new(), Ok(incidents))
    }

    /// Fails `failures` times, then returns `incidents`.
    pub fn failing_then(failures: usize, incidents: Vec<Incident>) -> Self {
        let script = (0..failures).map(|n| Err(source_error(n))).collect();
        Self::scripted(script, Ok(incidents))
    }

    /// Never succeeds.
    pub fn always_failing() -> Self {
        Self::scripted(Vec::new(), Err(RiskWatchError::Source("feed offline".into())))
    }

    pub fn scripted(
        script: Vec<DomainResult<Vec<Incident>>>,
        fallback: DomainResult<Vec<Incident>>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            fetch_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every fetch take `delay` before answering.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IncidentSource for ScriptedSource {
    async fn fetch_recent_incidents(&self) -> DomainResult<Vec<Incident>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Sink that deduplicates by key and records every call.
#[derive(Default)]
pub struct RecordingSink {
    stored: Mutex<HashMap<RiskKey, Risk>>,
    calls: Mutex<Vec<RiskKey>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject creates for this external id.
    pub fn fail_for(self, external_id: &str) -> Self {
        self.failing.lock().insert(external_id.to_string());
        self
    }

    pub fn stored_count(&self) -> usize {
        self.stored.lock().len()
    }

    pub fn calls(&self) -> Vec<RiskKey> {
        self.calls.lock().clone()
    }

    pub fn stored(&self, external_id: &str) -> Option<Risk> {
        self.stored.lock().values().find(|risk| risk.external_id == external_id).cloned()
    }
}

#[async_trait]
impl RiskSink for RecordingSink {
    async fn create_if_absent(&self, risk: &Risk) -> DomainResult<CreateOutcome> {
        self.calls.lock().push(risk.key());
        if self.failing.lock().contains(&risk.external_id) {
            return Err(RiskWatchError::Database(format!("rejected {}", risk.external_id)));
        }

        let mut stored = self.stored.lock();
        if stored.contains_key(&risk.key()) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        stored.insert(risk.key(), risk.clone());
        Ok(CreateOutcome::Created)
    }
}

pub fn incident(external_id: &str, severity: Severity) -> Incident {
    Incident::new(external_id, format!("Incident {external_id}"), severity, "sentinel")
}

fn source_error(n: usize) -> RiskWatchError {
    RiskWatchError::Source(format!("transient failure #{}", n + 1))
}
