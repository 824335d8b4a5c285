//! Scheduling infrastructure for background incident synchronization
//!
//! The engine follows the runtime rules used throughout the workspace:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all external calls
//! - Structured tracing with metrics integration

pub mod error;
pub mod incident_sync;

pub use error::{SchedulerError, SchedulerResult};
pub use incident_sync::{IncidentSyncEngine, ShutdownSignal};
