//! Resilience patterns for transient failures
//!
//! - **Backoff**: deterministic, capped delay sequences
//! - **Retry**: bounded, cancellable re-execution of fallible async work

pub mod backoff;
pub mod retry;

pub use backoff::BackoffStrategy;
pub use retry::{RetryConfig, RetryError, RetryExecutor, RetryOutcome, RetryResult};
