//! Macro for implementing Display and FromStr for status enums
//!
//! Generates a single string mapping for both directions so that status
//! enums persisted as text (engine states, risk tags) round-trip
//! consistently.
//!
//! # Example
//!
//! ```rust
//! use riskwatch_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum FeedStatus {
//!     Online,
//!     Degraded,
//! }
//!
//! impl_domain_status_conversions!(FeedStatus {
//!     Online => "online",
//!     Degraded => "DEGRADED",
//! });
//!
//! assert_eq!(FeedStatus::Degraded.to_string(), "DEGRADED");
//! assert_eq!("degraded".parse::<FeedStatus>().unwrap(), FeedStatus::Degraded);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// - Display writes the mapped string exactly as given
/// - FromStr matches the mapped string case-insensitively
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
