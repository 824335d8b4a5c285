//! Conversions from external infrastructure errors into domain errors.

use riskwatch_domain::RiskWatchError;
use rusqlite::Error as SqlError;
use serde_json::Error as JsonError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RiskWatchError);

impl From<InfraError> for RiskWatchError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RiskWatchError> for InfraError {
    fn from(value: RiskWatchError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRiskWatchError {
    fn into_riskwatch(self) -> RiskWatchError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → RiskWatchError */
/* -------------------------------------------------------------------------- */

impl IntoRiskWatchError for SqlError {
    fn into_riskwatch(self) -> RiskWatchError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        RiskWatchError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        RiskWatchError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        RiskWatchError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ReadOnly, _) => {
                        RiskWatchError::Database("database is read-only".into())
                    }
                    _ => RiskWatchError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => RiskWatchError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                RiskWatchError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                RiskWatchError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => RiskWatchError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => RiskWatchError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_riskwatch())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → RiskWatchError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(RiskWatchError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → RiskWatchError */
/* -------------------------------------------------------------------------- */

impl IntoRiskWatchError for JsonError {
    fn into_riskwatch(self) -> RiskWatchError {
        if self.is_io() {
            return RiskWatchError::Source(format!("failed to read JSON: {self}"));
        }
        RiskWatchError::InvalidInput(format!(
            "malformed JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_riskwatch())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → RiskWatchError */
/* -------------------------------------------------------------------------- */

impl IntoRiskWatchError for std::io::Error {
    fn into_riskwatch(self) -> RiskWatchError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => RiskWatchError::NotFound(self.to_string()),
            ErrorKind::TimedOut => RiskWatchError::Timeout(self.to_string()),
            _ => RiskWatchError::Source(format!("I/O error: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_riskwatch())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → RiskWatchError */
/* -------------------------------------------------------------------------- */

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        let message = if value.is_cancelled() {
            "blocking task cancelled".to_string()
        } else {
            format!("blocking task panicked: {value}")
        };
        InfraError(RiskWatchError::Internal(message))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
