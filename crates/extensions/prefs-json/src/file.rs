//! JSON file preference store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dropin_protocols::{PreferenceStore, StorageError};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::PrefsError;

/// Preference store backed by a single JSON object on disk.
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    /// Contents of the file as last read or written.
    cache: RwLock<Map<String, Value>>,
}

impl JsonFilePreferenceStore {
    /// Open the store at `path`, creating its directory if needed.
    ///
    /// A missing file is an empty store; it is created on the first `set`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PrefsError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PrefsError::CreateDirFailed {
                        path: parent.to_path_buf(),
                        reason: e.to_string(),
                    })?;
                info!("Created preferences directory: {:?}", parent);
            }
        }

        let cache = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&content)? {
                    Value::Object(map) => map,
                    _ => return Err(PrefsError::NotAnObject { path }),
                }
            }
        } else {
            Map::new()
        };
        debug!("Loaded {} preferences from {:?}", cache.len(), path);

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, contents: &Map<String, Value>) -> Result<(), PrefsError> {
        let json = serde_json::to_string_pretty(contents)?;
        fs::write(&self.path, json).await?;
        debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    async fn get(&self, keys: &[&str]) -> Result<Vec<(String, Value)>, StorageError> {
        let cache = self.cache.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| cache.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<(), StorageError> {
        let mut cache = self.cache.write().await;
        let mut updated = cache.clone();
        updated.extend(entries);
        self.write(&updated).await?;
        *cache = updated;
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
