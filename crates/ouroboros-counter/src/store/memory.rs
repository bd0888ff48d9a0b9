//! In-memory counter store
//!
//! Values are kept as raw strings so the store can hold non-numeric data the
//! same way Redis can. Per-key atomicity comes from DashMap's shard locks.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{CounterStore, NOT_AN_INTEGER};
use crate::CounterError;

/// In-memory counter store (thread-safe, non-distributed)
#[derive(Clone, Default)]
pub struct InMemoryCounterStore {
    values: Arc<DashMap<String, String>>,
}

impl InMemoryCounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value, bypassing counter arithmetic
    pub fn set_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get the number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn apply(raw: &str, delta: i64) -> Result<i64, CounterError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|current| current.checked_add(delta))
        .ok_or_else(|| CounterError::Store(NOT_AN_INTEGER.to_string()))
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<i64, CounterError> {
        let mut entry = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| "0".to_string());

        let next = apply(entry.value(), 1)?;
        *entry.value_mut() = next.to_string();

        Ok(next)
    }

    async fn decrement(&self, key: &str) -> Result<i64, CounterError> {
        let mut entry = self
            .values
            .get_mut(key)
            .ok_or_else(|| CounterError::NotFound(key.to_string()))?;

        let next = apply(entry.value(), -1)?;
        *entry.value_mut() = next.to_string();

        Ok(next)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CounterError> {
        Ok(self.values.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, CounterError> {
        Ok(self.values.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, CounterError> {
        Ok(self.values.contains_key(key))
    }

    async fn health_check(&self) -> Result<(), CounterError> {
        Ok(())
    }
}
