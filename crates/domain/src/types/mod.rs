//! Domain types and models

pub mod incident;
pub mod risk;
pub mod sync;

pub use incident::{Incident, Severity};
pub use risk::{Risk, RiskKey, RiskTag, StoredRisk};
pub use sync::{EngineState, PassSummary, SyncMetrics};
