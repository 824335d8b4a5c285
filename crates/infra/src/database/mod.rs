//! Risk store implementations

pub mod manager;
pub mod memory;
pub mod risk_repository;

pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use memory::InMemoryRiskSink;
pub use risk_repository::SqliteRiskRepository;
