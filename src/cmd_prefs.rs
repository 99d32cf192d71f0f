//! `prefs` subcommand: print the persisted panel preferences.
//!
//! Also home to the store helpers the other subcommands share.

use std::sync::Arc;

use dropin_config::Config;
use dropin_prefs_json::JsonFilePreferenceStore;
use dropin_protocols::{keys, PreferenceStore};
use tracing::warn;

/// Open the configured preference store.
///
/// A store that cannot be opened is logged and skipped; the caller runs
/// without persistence.
pub(crate) async fn open_store(config: &Config) -> Option<Arc<JsonFilePreferenceStore>> {
    let path = config.storage.resolved_path();
    match JsonFilePreferenceStore::open(&path).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!("Preferences at {} unavailable: {}", path.display(), e);
            None
        }
    }
}

/// Stored `showEmpty` flag, false when absent or unreadable.
pub(crate) async fn stored_show_empty(config: &Config) -> bool {
    let Some(store) = open_store(config).await else {
        return false;
    };
    match store.get(&[keys::SHOW_EMPTY]).await {
        Ok(entries) => entries
            .into_iter()
            .find_map(|(_, value)| value.as_bool())
            .unwrap_or(false),
        Err(e) => {
            warn!("Failed to read preferences: {}", e);
            false
        }
    }
}

/// Handle the prefs subcommand.
pub(crate) async fn handle_prefs(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = config.storage.resolved_path();
    let store = JsonFilePreferenceStore::open(&path).await?;
    let entries = store.get(&keys::ALL).await?;

    println!("Preferences: {}", path.display());
    if entries.is_empty() {
        println!("  (none stored)");
    }
    for (key, value) in entries {
        println!("  {} = {}", key, value);
    }
    Ok(())
}
