//! # RiskWatch Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the incident source and the risk store
//! - The incident classification policy
//! - The retry coordinator and the single sync pass use case
//!
//! ## Architecture Principles
//! - Only depends on `riskwatch-common` and `riskwatch-domain`
//! - No database, HTTP, or file system code
//! - All external dependencies via traits

pub mod incident;

pub use incident::classifier::{classify, IngestDecision};
pub use incident::errors::FetchError;
pub use incident::ports::{CreateOutcome, IncidentSource, RiskSink};
pub use incident::retry::{FetchedIncidents, RetryCoordinator};
pub use incident::service::{IncidentSyncService, PassOutcome};
