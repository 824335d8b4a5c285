//! Risk records derived from ingested incidents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_domain_status_conversions;

/// Tag attached to a risk record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTag {
    /// The risk originated from an external incident.
    Incident,
    /// The risk was created without operator involvement.
    Automated,
}

impl_domain_status_conversions!(RiskTag {
    Incident => "INCIDENT",
    Automated => "AUTOMATED",
});

/// Deduplication key: a risk is unique per originating incident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskKey {
    pub source: String,
    pub external_id: String,
}

/// Risk record as proposed for ingestion.
///
/// Identity and creation time are assigned by the store that accepts it, see
/// [`StoredRisk`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub title: String,
    pub description: String,
    pub impact: i32,
    pub probability: i32,
    pub source: String,
    pub external_id: String,
    pub tags: Vec<RiskTag>,
}

impl Risk {
    pub fn key(&self) -> RiskKey {
        RiskKey { source: self.source.clone(), external_id: self.external_id.clone() }
    }

    pub fn has_tag(&self, tag: RiskTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Tags joined with `,` for text storage.
    pub fn tags_csv(&self) -> String {
        self.tags.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
    }

    /// Parse tags stored by [`Risk::tags_csv`]; unknown entries are dropped.
    pub fn parse_tags_csv(csv: &str) -> Vec<RiskTag> {
        csv.split(',').filter_map(|tag| tag.trim().parse().ok()).collect()
    }
}

/// A risk accepted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRisk {
    pub id: Uuid,
    #[serde(flatten)]
    pub risk: Risk,
    pub created_at: DateTime<Utc>,
}
