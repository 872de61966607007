//! Error types for the cache crate
//!
//! Cache operations never fail; the only fallible surface is configuration
//! loading.

use thiserror::Error;

// == Config Error Enum ==
/// Error raised while reading cache configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
