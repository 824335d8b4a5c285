//! Domain utilities

pub mod serde;

pub use self::serde::duration_millis;
