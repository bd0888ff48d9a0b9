//! Wire shapes for counter results and failures
//!
//! Field names are fixed by the public API: success bodies carry `Key`,
//! `Value` and `ActionTimestamp`; failure bodies carry `ErrorMessage` and
//! `TransactionTs`. Timestamps are RFC 3339, second precision, UTC.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{CounterError, OperationResult};

/// Render a timestamp the way every response carries it
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Success body for counter operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CounterResponse {
    pub key: String,
    pub value: i64,
    pub action_timestamp: String,
}

impl From<OperationResult> for CounterResponse {
    fn from(result: OperationResult) -> Self {
        Self {
            action_timestamp: format_timestamp(&result.timestamp),
            key: result.key,
            value: result.value,
        }
    }
}

/// Failure body: a message and the instant of failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub error_message: String,
    pub transaction_ts: String,
}

impl ErrorResponse {
    /// Create a failure stamped with the current time
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
            transaction_ts: format_timestamp(&Utc::now()),
        }
    }
}

impl From<&CounterError> for ErrorResponse {
    fn from(err: &CounterError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<CounterError> for ErrorResponse {
    fn from(err: CounterError) -> Self {
        Self::from(&err)
    }
}
