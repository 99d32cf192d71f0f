//! Preference storage protocol.
//!
//! The inspector persists a handful of panel preferences (visibility, position,
//! the empty-marker filter) through an external key/value store.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;

/// Fixed keys used for persisted preferences.
pub mod keys {
    /// Whether the panel was open.
    pub const VISIBLE: &str = "dropinInspector_visible";
    /// Last panel position (`{top, left, right}`).
    pub const POSITION: &str = "dropinInspector_position";
    /// The show-empty-markers switch.
    pub const SHOW_EMPTY: &str = "dropinInspector_showEmpty";

    /// Every key, in the order they are read at start-up.
    pub const ALL: [&str; 3] = [VISIBLE, POSITION, SHOW_EMPTY];
}

/// Key/value preference storage.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read the requested keys. Missing keys are simply absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<Vec<(String, Value)>, StorageError>;

    /// Write the given entries, replacing existing values.
    async fn set(&self, entries: Vec<(String, Value)>) -> Result<(), StorageError>;
}
