//! Incident fetch errors

use riskwatch_domain::RiskWatchError;
use thiserror::Error;

/// Why a fetch with retries produced no incidents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Every attempt failed; carries the error from the final attempt.
    #[error("incident fetch failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: RiskWatchError },

    /// Cancellation was observed while waiting to retry.
    #[error("incident fetch cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl FetchError {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

impl From<FetchError> for RiskWatchError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Exhausted { last_error, .. } => last_error,
            FetchError::Cancelled { .. } => RiskWatchError::Internal(err.to_string()),
        }
    }
}
