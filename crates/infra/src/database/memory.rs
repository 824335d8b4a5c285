//! In-memory risk store
//!
//! An owned registry behind a lock, keyed by `(source, external_id)`. Useful
//! for tests and for running the engine without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use riskwatch_core::{CreateOutcome, RiskSink};
use riskwatch_domain::{Result as DomainResult, Risk, RiskKey, StoredRisk};
use uuid::Uuid;

/// Lock-guarded [`RiskSink`] that keeps risks in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRiskSink {
    risks: RwLock<HashMap<RiskKey, StoredRisk>>,
}

impl InMemoryRiskSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.risks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.risks.read().is_empty()
    }

    pub fn get(&self, key: &RiskKey) -> Option<StoredRisk> {
        self.risks.read().get(key).cloned()
    }

    /// Copy of every stored risk, oldest first.
    pub fn risks(&self) -> Vec<StoredRisk> {
        let mut risks: Vec<_> = self.risks.read().values().cloned().collect();
        risks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        risks
    }
}

#[async_trait]
impl RiskSink for InMemoryRiskSink {
    async fn create_if_absent(&self, risk: &Risk) -> DomainResult<CreateOutcome> {
        let mut risks = self.risks.write();
        let key = risk.key();
        if risks.contains_key(&key) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let stored = StoredRisk { id: Uuid::now_v7(), risk: risk.clone(), created_at: Utc::now() };
        risks.insert(key, stored);
        Ok(CreateOutcome::Created)
    }
}
