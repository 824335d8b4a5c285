//! Observability infrastructure
//!
//! Synchronization health is held in a [`SyncMetricsRegister`]: one owned
//! register shared between the sync engine (the only writer) and any number of
//! readers. Readers always receive a copy, never a live reference.

pub mod metrics;

pub use metrics::sync::SyncMetricsRegister;
