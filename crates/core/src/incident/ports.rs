//! Port interfaces for incident synchronization

use async_trait::async_trait;
use riskwatch_domain::{Incident, Result, Risk};

/// Supplies the current snapshot of incidents known to an external system.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Fetch the best-effort current snapshot.
    ///
    /// An empty vector is a valid result. Every error is treated as transient
    /// and may be retried by the caller.
    async fn fetch_recent_incidents(&self) -> Result<Vec<Incident>>;
}

/// Result of an idempotent create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new risk was stored.
    Created,
    /// A risk for the same `(source, external_id)` already existed.
    AlreadyExists,
}

/// Durable store for risks derived from incidents.
#[async_trait]
pub trait RiskSink: Send + Sync {
    /// Store `risk` unless one with the same `(source, external_id)` exists.
    ///
    /// Must be idempotent: repeated calls for the same key leave exactly one
    /// stored record.
    async fn create_if_absent(&self, risk: &Risk) -> Result<CreateOutcome>;
}
