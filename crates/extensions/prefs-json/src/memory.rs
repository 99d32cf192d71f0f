//! In-memory preference store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dropin_protocols::{PreferenceStore, StorageError};
use serde_json::Value;
use tokio::sync::RwLock;

/// Preference store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value))
                    .collect(),
            ),
        }
    }

    /// Copy of everything stored.
    pub async fn snapshot(&self) -> BTreeMap<String, Value> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, keys: &[&str]) -> Result<Vec<(String, Value)>, StorageError> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| {
                entries
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<(), StorageError> {
        self.entries.write().await.extend(entries);
        Ok(())
    }
}
