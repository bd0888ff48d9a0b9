//! Counter key validation
//!
//! A counter key is always a syntactically valid UUID string. Caller keys
//! that parse are kept verbatim; anything else is swapped for a fresh v4
//! UUID unless the strict policy is in force.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::CounterError;

/// Key addressing a counter in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterKey(String);

impl CounterKey {
    /// Generate a new random key (UUID v4, lowercase hyphenated)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a caller-supplied key, keeping the original text on success
    pub fn parse(candidate: &str) -> Result<Self, CounterError> {
        Uuid::parse_str(candidate)
            .map(|_| Self(candidate.to_string()))
            .map_err(|e| CounterError::InvalidKey(format!("{}: {}", candidate, e)))
    }

    /// Resolve an optional caller key, generating one when absent or malformed
    pub fn resolve(candidate: Option<&str>) -> Self {
        match candidate {
            Some(raw) => match Self::parse(raw) {
                Ok(key) => key,
                Err(_) => {
                    let key = Self::generate();
                    info!(
                        provided = %raw,
                        key = %key,
                        "Unable to parse provided key, generated a new one"
                    );
                    key
                }
            },
            None => {
                let key = Self::generate();
                info!(key = %key, "Generated new counter key");
                key
            }
        }
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CounterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CounterKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How malformed caller keys are treated on the increment paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// Replace malformed keys with a generated one
    #[default]
    Lenient,
    /// Reject malformed keys with [`CounterError::InvalidKey`]
    Strict,
}

impl KeyPolicy {
    /// Resolve an optional caller key under this policy.
    ///
    /// An absent key always yields a generated one, in both modes.
    pub fn resolve(self, candidate: Option<&str>) -> Result<CounterKey, CounterError> {
        match (self, candidate) {
            (KeyPolicy::Strict, Some(raw)) => CounterKey::parse(raw),
            (_, candidate) => Ok(CounterKey::resolve(candidate)),
        }
    }
}
