//! Counter store implementations
//!
//! Provides the capability trait the counter operations run against, with a
//! Redis implementation for production and an in-memory one for tests and
//! local runs.

use async_trait::async_trait;

use crate::CounterError;

/// Narrow interface over the external key-value store.
///
/// Each method maps 1:1 onto an atomic store primitive. Implementations hold
/// no counter state of their own between calls.
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Atomically add 1, creating the key at 0 first when absent
    async fn increment(&self, key: &str) -> Result<i64, CounterError>;

    /// Atomically subtract 1 from an existing key.
    ///
    /// Fails with [`CounterError::NotFound`] when the key is absent at the
    /// moment the store evaluates the command.
    async fn decrement(&self, key: &str) -> Result<i64, CounterError>;

    /// Get the raw stored value
    async fn get(&self, key: &str) -> Result<Option<String>, CounterError>;

    /// Delete a key, returning whether it was removed
    async fn delete(&self, key: &str) -> Result<bool, CounterError>;

    /// Check whether a key exists
    async fn exists(&self, key: &str) -> Result<bool, CounterError>;

    /// Health check
    async fn health_check(&self) -> Result<(), CounterError>;
}

/// Message the store reports for arithmetic on non-integer data
pub(crate) const NOT_AN_INTEGER: &str = "value is not an integer or out of range";

pub mod memory;

pub use memory::InMemoryCounterStore;

// Redis store implementation
#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "redis")]
pub use self::redis::{RedisCounterStore, RedisStoreConfig};
