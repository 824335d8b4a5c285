//! Common utilities shared across RiskWatch crates.
//!
//! Currently hosts the resilience primitives (backoff and cancellable
//! retry) used by the incident sync pipeline.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

pub use resilience::{
    BackoffStrategy, RetryConfig, RetryError, RetryExecutor, RetryOutcome, RetryResult,
};
