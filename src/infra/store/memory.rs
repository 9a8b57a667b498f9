//! In-memory shared store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{RelayError, SharedStore};

/// Simple in-memory store for development/testing.
///
/// Writes go through [`InMemoryStore::insert`], standing in for the host
/// application; the relay itself only reads.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Write a value, as the host application would.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    /// Delete a value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }
}

#[async_trait]
impl SharedStore for InMemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, RelayError> {
        Ok(self.entries.read().get(key).cloned())
    }
}
