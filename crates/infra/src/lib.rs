//! # RiskWatch Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The incident sync engine (schedule, manual triggers, shutdown)
//! - The synchronization metrics register
//! - Risk stores (SQLite and in-memory)
//! - The JSON snapshot incident source
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `riskwatch-core`
//! - Depends on `riskwatch-common`, `riskwatch-domain` and `riskwatch-core`
//! - Contains all "impure" code (I/O, timers, background tasks)

pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, InMemoryRiskSink, SqliteRiskRepository};
pub use errors::InfraError;
pub use integrations::JsonFileIncidentSource;
pub use observability::SyncMetricsRegister;
pub use scheduling::{
    IncidentSyncEngine, SchedulerError, SchedulerResult, ShutdownSignal,
};
