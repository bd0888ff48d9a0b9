//! ouroboros-counter: named atomic counters over an external key-value store
//!
//! Counters live entirely in the store. This crate decides which key a request
//! operates on and maps increment/decrement/check/delete onto the store's
//! atomic primitives.
//!
//! # Components
//! - [`key`]: caller key validation with silent UUID fallback
//! - [`service`]: the counter operations
//! - [`store`]: the [`CounterStore`] capability trait (Redis and in-memory)
//! - [`response`]: wire shapes for results and failures

pub mod error;
pub mod key;
pub mod model;
pub mod response;
pub mod service;
pub mod store;

// Re-exports
pub use error::CounterError;
pub use key::{CounterKey, KeyPolicy};
pub use model::OperationResult;
pub use response::{format_timestamp, CounterResponse, ErrorResponse};
pub use service::CounterService;
pub use store::{CounterStore, InMemoryCounterStore};

#[cfg(feature = "redis")]
pub use store::{RedisCounterStore, RedisStoreConfig};

/// Result type for counter operations
pub type Result<T> = std::result::Result<T, CounterError>;
