//! Counter operations
//!
//! Every operation is stateless across calls: the store is the only place a
//! counter lives, and all arithmetic goes through its atomic primitives. The
//! service never reads a value, changes it locally and writes it back.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::{CounterError, CounterStore, KeyPolicy, OperationResult};

/// Counter operations over an injected store
#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn CounterStore>,
    key_policy: KeyPolicy,
}

impl CounterService {
    /// Create a service with the lenient key policy
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self::with_key_policy(store, KeyPolicy::default())
    }

    /// Create a service with an explicit key policy
    pub fn with_key_policy(store: Arc<dyn CounterStore>, key_policy: KeyPolicy) -> Self {
        Self { store, key_policy }
    }

    pub fn key_policy(&self) -> KeyPolicy {
        self.key_policy
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    /// Increment a counter, creating it when the key is new.
    ///
    /// An absent or malformed key is replaced with a generated one; the key
    /// actually used is returned in the result.
    pub async fn create_or_increment(
        &self,
        key: Option<&str>,
    ) -> Result<OperationResult, CounterError> {
        let key = self.key_policy.resolve(key)?;

        let value = self.store.increment(key.as_str()).await.map_err(|e| {
            error!(key = %key, "Error incrementing counter: {}", e);
            e
        })?;

        debug!(key = %key, value, "Counter incremented");

        Ok(OperationResult::now(key.into_string(), value))
    }

    /// Increment the counter under a caller-supplied key.
    ///
    /// Same semantics as [`Self::create_or_increment`]; the key still goes
    /// through validation.
    pub async fn increment_with_key(&self, key: &str) -> Result<OperationResult, CounterError> {
        self.create_or_increment(Some(key)).await
    }

    /// Decrement an existing counter
    pub async fn decrement(&self, key: &str) -> Result<OperationResult, CounterError> {
        if self.store.get(key).await?.is_none() {
            return Err(CounterError::NotFound(key.to_string()));
        }

        // A delete may land between the probe and here; the store's
        // conditional decrement then reports NotFound.
        let value = self.store.decrement(key).await?;

        debug!(key = %key, value, "Counter decremented");

        Ok(OperationResult::now(key, value))
    }

    /// Read a counter without changing it
    pub async fn check(&self, key: &str) -> Result<OperationResult, CounterError> {
        let raw = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| CounterError::NotFound(key.to_string()))?;

        let value: i64 = raw.parse()?;

        Ok(OperationResult::now(key, value))
    }

    /// Delete a counter.
    ///
    /// Returns `false` when the key does not exist; that is an expected
    /// outcome rather than an error.
    pub async fn delete(&self, key: &str) -> Result<bool, CounterError> {
        if !self.store.exists(key).await? {
            info!(key = %key, "Counter to delete not found");
            return Ok(false);
        }

        let removed = self.store.delete(key).await?;

        debug!(key = %key, removed, "Counter deleted");

        Ok(removed)
    }

    /// Check that the store is reachable
    pub async fn health_check(&self) -> Result<(), CounterError> {
        self.store.health_check().await
    }
}
