//! Counter error types

use thiserror::Error;

/// Counter-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    /// The store is unreachable, timed out, or rejected the command
    #[error("Store error: {0}")]
    Store(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    /// The stored value is not a 64-bit integer
    #[error("Parse error: {0}")]
    Parse(String),

    /// Only raised under [`crate::KeyPolicy::Strict`]
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CounterError {
    /// Returns true if the error reports a missing key
    pub fn is_not_found(&self) -> bool {
        matches!(self, CounterError::NotFound(_))
    }
}

impl From<std::num::ParseIntError> for CounterError {
    fn from(err: std::num::ParseIntError) -> Self {
        CounterError::Parse(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CounterError {
    fn from(err: redis::RedisError) -> Self {
        CounterError::Store(err.to_string())
    }
}
