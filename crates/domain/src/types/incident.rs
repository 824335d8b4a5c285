//! Incidents reported by an external security-event source.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Incident severity as reported by the source.
///
/// Ordered `Low < Medium < High < Critical`. Any label the source sends that
/// is not one of those four parses as [`Severity::Unknown`], which sorts
/// below `Low` and is never ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a source label, falling back to `Unknown` instead of failing.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            "CRITICAL" => Self::Critical,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_str().to_string()
    }
}

/// Immutable snapshot of one incident, valid for the duration of a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Identifier assigned by the source; unique within that source.
    #[serde(alias = "externalID")]
    pub external_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    /// Name of the originating system.
    pub source: String,
}

impl Incident {
    pub fn new(
        external_id: impl Into<String>,
        title: impl Into<String>,
        severity: Severity,
        source: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            description: String::new(),
            severity,
            source: source.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
