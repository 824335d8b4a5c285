//! Incident source backed by a JSON snapshot file.
//!
//! The file holds a JSON array of incidents and is re-read on every fetch, so
//! whatever drops the feed can replace it atomically between passes:
//!
//! ```json
//! [
//!   {
//!     "externalID": "case_1234",
//!     "title": "Leaked deploy key",
//!     "description": "Key found in a public gist",
//!     "severity": "CRITICAL",
//!     "source": "sentinel"
//!   }
//! ]
//! ```
//!
//! Unknown severity labels deserialize as `Severity::Unknown` and are never
//! ingested. A missing, unreadable or malformed file is a fetch failure.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use riskwatch_core::IncidentSource;
use riskwatch_domain::{Incident, Result as DomainResult, RiskWatchError};
use tracing::debug;

use crate::errors::InfraError;

/// Reads incidents from a JSON file on each fetch.
#[derive(Debug, Clone)]
pub struct JsonFileIncidentSource {
    path: PathBuf,
}

impl JsonFileIncidentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IncidentSource for JsonFileIncidentSource {
    async fn fetch_recent_incidents(&self) -> DomainResult<Vec<Incident>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            RiskWatchError::Source(format!(
                "failed to read incident snapshot {}: {}",
                self.path.display(),
                RiskWatchError::from(InfraError::from(err))
            ))
        })?;

        let incidents: Vec<Incident> = serde_json::from_slice(&bytes)
            .map_err(|err| RiskWatchError::from(InfraError::from(err)))?;

        debug!(path = %self.path.display(), count = incidents.len(), "Incident snapshot read");
        Ok(incidents)
    }
}

#[cfg(test)]
mod tests {
    use riskwatch_domain::Severity;
    use tempfile::TempDir;

    use super::*;

    fn write_snapshot(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("incidents.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn reads_incident_array() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(
            &dir,
            r#"[
                {"externalID": "case_1234", "title": "Leaked key", "severity": "CRITICAL", "source": "sentinel"},
                {"externalId": "case_5678", "title": "Port scan", "description": "noise", "severity": "low", "source": "sentinel"}
            ]"#,
        );

        let incidents = JsonFileIncidentSource::new(path).fetch_recent_incidents().await.unwrap();

        assert_eq!(incidents.len(), 2);
        assert_eq!(incidents[0].external_id, "case_1234");
        assert_eq!(incidents[0].severity, Severity::Critical);
        assert_eq!(incidents[1].severity, Severity::Low);
        assert_eq!(incidents[1].description, "noise");
    }

    #[tokio::test]
    async fn unknown_severity_is_tolerated() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(
            &dir,
            r#"[{"externalID": "x", "title": "t", "severity": "SEVERE", "source": "s"}]"#,
        );

        let incidents = JsonFileIncidentSource::new(path).fetch_recent_incidents().await.unwrap();
        assert_eq!(incidents[0].severity, Severity::Unknown);
    }

    #[tokio::test]
    async fn empty_array_is_a_valid_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, "[]");

        let incidents = JsonFileIncidentSource::new(path).fetch_recent_incidents().await.unwrap();
        assert!(incidents.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_source_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonFileIncidentSource::new(dir.path().join("absent.json"));

        let err = source.fetch_recent_incidents().await.unwrap_err();
        assert!(matches!(err, RiskWatchError::Source(ref msg) if msg.contains("absent.json")));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, r#"{"not": "an array"}"#);

        let result = JsonFileIncidentSource::new(path).fetch_recent_incidents().await;
        assert!(matches!(result, Err(RiskWatchError::InvalidInput(_))));
    }
}
