//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for RiskWatch
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RiskWatchError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The incident source could not produce a snapshot.
    #[error("Incident source error: {0}")]
    Source(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for RiskWatch operations
pub type Result<T> = std::result::Result<T, RiskWatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_prefix() {
        let err = RiskWatchError::Source("feed unavailable".into());
        assert_eq!(err.to_string(), "Incident source error: feed unavailable");
    }

    #[test]
    fn serializes_as_tagged_object() {
        let err = RiskWatchError::Database("locked".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Database");
        assert_eq!(json["message"], "locked");
    }
}
