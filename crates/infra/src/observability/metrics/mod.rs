//! Metrics collected by the infrastructure layer

pub mod sync;

pub use sync::SyncMetricsRegister;
