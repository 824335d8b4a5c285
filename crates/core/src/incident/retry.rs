//! Retry coordinator for incident fetches
//!
//! One logical fetch makes up to `max_retries + 1` attempts against the
//! source, sleeping between failures according to the backoff strategy. Only
//! fetch failures are retried; what happens to the fetched incidents is the
//! caller's business.

use std::time::Duration;

use riskwatch_common::{BackoffStrategy, RetryConfig, RetryError, RetryExecutor};
use riskwatch_domain::{EngineConfig, Incident, RiskWatchError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::errors::FetchError;
use super::ports::IncidentSource;

/// Incidents returned by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedIncidents {
    pub incidents: Vec<Incident>,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// Executes one logical fetch with bounded retries and backoff.
#[derive(Debug, Clone)]
pub struct RetryCoordinator {
    executor: RetryExecutor,
    fetch_timeout: Duration,
}

impl RetryCoordinator {
    pub fn new(max_retries: u32, backoff: BackoffStrategy, fetch_timeout: Duration) -> Self {
        Self {
            executor: RetryExecutor::new(RetryConfig::new(max_retries, backoff)),
            fetch_timeout,
        }
    }

    /// Exponential backoff between `initial_backoff` and `max_backoff`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.max_retries,
            BackoffStrategy::exponential(config.initial_backoff, config.max_backoff),
            config.fetch_timeout,
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.executor.config().max_retries
    }

    pub fn backoff(&self) -> &BackoffStrategy {
        &self.executor.config().backoff
    }

    /// Fetch incidents, retrying transient failures.
    ///
    /// An attempt that exceeds the fetch timeout counts as a failed attempt.
    /// Cancellation is observed only during the sleep between attempts.
    ///
    /// # Errors
    /// - [`FetchError::Exhausted`] with the final attempt's error once
    ///   `max_retries + 1` attempts have failed
    /// - [`FetchError::Cancelled`] if `cancel` fires while waiting to retry
    pub async fn attempt_sync(
        &self,
        source: &dyn IncidentSource,
        cancel: &CancellationToken,
    ) -> Result<FetchedIncidents, FetchError> {
        let fetch_timeout = self.fetch_timeout;

        let outcome = self
            .executor
            .execute_with_outcome(
                |attempt| async move {
                    match tokio::time::timeout(fetch_timeout, source.fetch_recent_incidents()).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(RiskWatchError::Timeout(format!(
                            "fetch attempt {} exceeded {fetch_timeout:?}",
                            attempt + 1
                        ))),
                    }
                },
                cancel,
            )
            .await;

        match outcome.result {
            Ok(incidents) => {
                debug!(
                    attempts = outcome.attempts,
                    fetched = incidents.len(),
                    "Incident fetch succeeded"
                );
                Ok(FetchedIncidents { incidents, attempts: outcome.attempts })
            }
            Err(RetryError::Cancelled { attempts }) => Err(FetchError::Cancelled { attempts }),
            Err(RetryError::AttemptsExhausted { attempts, last_error }) => {
                Err(FetchError::Exhausted { attempts, last_error })
            }
        }
    }
}
