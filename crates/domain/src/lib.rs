//! # RiskWatch Domain
//!
//! Business domain types for the incident synchronization engine.
//!
//! This crate contains:
//! - Incident and risk records
//! - Synchronization metrics and engine state
//! - Engine configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other RiskWatch crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
