//! Operation outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a successful counter operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Key the operation ran against
    pub key: String,
    /// Counter value after the operation
    pub value: i64,
    /// Instant the outcome was captured
    pub timestamp: DateTime<Utc>,
}

impl OperationResult {
    /// Create a result stamped with the current time
    pub fn now(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}
