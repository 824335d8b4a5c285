//! Incident synchronization domain

pub mod classifier;
pub mod errors;
pub mod ports;
pub mod retry;
pub mod service;
