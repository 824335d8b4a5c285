//! Cancellable retry executor
//!
//! Runs a fallible async operation until it succeeds, the retry budget is
//! spent, or the caller cancels. Every error is treated as transient. Cancellation is
//! observed only while sleeping between attempts, so an attempt that has
//! started always runs to completion.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::backoff::BackoffStrategy;

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every permitted attempt failed; carries the final error
    #[error("All retry attempts exhausted after {attempts} tries: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: E },

    /// Cancellation was observed during a backoff sleep
    #[error("Retry cancelled after {attempts} tries")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    /// Number of attempts made before the executor gave up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::AttemptsExhausted { attempts, .. } | Self::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    /// Attempts started, including the last one.
    pub attempts: u32,
    /// Time spent sleeping between attempts.
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    pub backoff: BackoffStrategy,
}

impl RetryConfig {
    pub fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self { max_retries, backoff }
    }

    /// Upper bound on attempts for one execution.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(
        &self,
        operation: F,
        cancel: &CancellationToken,
    ) -> RetryResult<T, E>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation, cancel).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    ///
    /// `operation` receives the 0-based attempt index.
    pub async fn execute_with_outcome<F, Fut, T, E>(
        &self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> RetryOutcome<T, E>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        let mut total_delay = Duration::ZERO;

        loop {
            let attempts = attempt + 1;
            debug!(
                attempt = attempts,
                max_attempts = self.config.max_attempts(),
                "Executing operation"
            );

            let error = match operation(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "Operation succeeded after retries");
                    }
                    return RetryOutcome { result: Ok(value), attempts, total_delay };
                }
                Err(error) => error,
            };

            if attempt >= self.config.max_retries {
                warn!(attempts, error = %error, "All retry attempts exhausted");
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted { attempts, last_error: error }),
                    attempts,
                    total_delay,
                };
            }

            let delay = self.config.backoff.delay(attempt);

            warn!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Operation failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempts, "Retry cancelled during backoff");
                    return RetryOutcome {
                        result: Err(RetryError::Cancelled { attempts }),
                        attempts,
                        total_delay,
                    };
                }
                () = tokio::time::sleep(delay) => {}
            }

            total_delay += delay;
            attempt += 1;
        }
    }
}
