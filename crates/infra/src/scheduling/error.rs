//! Scheduler error types

use std::time::Duration;

use riskwatch_domain::RiskWatchError;
use thiserror::Error;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `start` was called on an engine that is already running
    #[error("Scheduler already started")]
    AlreadyStarted,

    /// The engine has not been started yet
    #[error("Scheduler not running")]
    NotRunning,

    /// The engine has shut down; it cannot be restarted
    #[error("Scheduler stopped")]
    Stopped,

    /// Too many manual triggers are already waiting for a pass slot
    #[error("Manual trigger queue is full")]
    TriggerQueueFull,

    /// A manually triggered pass exhausted its fetch retries
    #[error("Sync pass failed after {attempts} attempts: {error}")]
    PassFailed { attempts: u32, error: RiskWatchError },

    /// A manually triggered pass was abandoned because of shutdown
    #[error("Sync pass cancelled after {attempts} attempts")]
    PassCancelled { attempts: u32 },

    /// The engine configuration cannot drive a schedule
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(RiskWatchError),

    /// Operation timed out
    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let domain_err = match err {
            SchedulerError::PassFailed { error, .. } | SchedulerError::InvalidConfig(error) => error,
            SchedulerError::AlreadyStarted
            | SchedulerError::NotRunning
            | SchedulerError::Stopped
            | SchedulerError::TriggerQueueFull => RiskWatchError::InvalidInput(err.to_string()),
            SchedulerError::Timeout { .. } => RiskWatchError::Timeout(err.to_string()),
            SchedulerError::PassCancelled { .. } | SchedulerError::TaskJoinFailed(_) => {
                RiskWatchError::Internal(err.to_string())
            }
        };
        InfraError(domain_err)
    }
}

impl From<SchedulerError> for RiskWatchError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

impl From<tokio::task::JoinError> for SchedulerError {
    fn from(err: tokio::task::JoinError) -> Self {
        SchedulerError::TaskJoinFailed(err.to_string())
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
