//! Incident classification policy
//!
//! Decides which incidents become risks. Classification is pure and total:
//! every incident maps to exactly one decision and nothing else happens.

use riskwatch_domain::constants::{INCIDENT_RISK_IMPACT, INCIDENT_RISK_PROBABILITY};
use riskwatch_domain::{Incident, Risk, RiskTag, Severity};

/// Prefix applied to incident titles when they become risk titles.
pub const RISK_TITLE_PREFIX: &str = "Incident: ";

/// What to do with one incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestDecision {
    /// Not significant enough to track.
    Ignore,
    /// Create this risk.
    Ingest(Risk),
}

impl IngestDecision {
    pub fn is_ingest(&self) -> bool {
        matches!(self, Self::Ingest(_))
    }
}

/// Classify one incident.
///
/// `High` and `Critical` incidents become risks with fixed impact and
/// probability; `Low`, `Medium` and unrecognised severities are ignored.
pub fn classify(incident: &Incident) -> IngestDecision {
    match incident.severity {
        Severity::High | Severity::Critical => IngestDecision::Ingest(risk_from(incident)),
        Severity::Low | Severity::Medium | Severity::Unknown => IngestDecision::Ignore,
    }
}

fn risk_from(incident: &Incident) -> Risk {
    Risk {
        title: format!("{RISK_TITLE_PREFIX}{}", incident.title),
        description: incident.description.clone(),
        impact: INCIDENT_RISK_IMPACT,
        probability: INCIDENT_RISK_PROBABILITY,
        source: incident.source.clone(),
        external_id: incident.external_id.clone(),
        tags: vec![RiskTag::Incident, RiskTag::Automated],
    }
}
