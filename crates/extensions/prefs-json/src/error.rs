//! Preference store errors.

use std::path::PathBuf;

use dropin_protocols::StorageError;
use thiserror::Error;

/// Errors that can occur in the JSON preference store.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON.
    #[error("Failed to parse preferences: {0}")]
    Parse(#[from] serde_json::Error),

    /// The file holds JSON that is not an object.
    #[error("Preferences file is not a JSON object: {path}")]
    NotAnObject { path: PathBuf },

    /// Failed to create the directory holding the file.
    #[error("Failed to create preferences directory at {path}: {reason}")]
    CreateDirFailed { path: PathBuf, reason: String },
}

impl From<PrefsError> for StorageError {
    fn from(err: PrefsError) -> Self {
        match err {
            PrefsError::Parse(e) => StorageError::Serialization(e),
            PrefsError::CreateDirFailed { .. } => StorageError::Unavailable(err.to_string()),
            PrefsError::NotAnObject { .. } => StorageError::ReadFailed(err.to_string()),
            PrefsError::Io(_) => StorageError::WriteFailed(err.to_string()),
        }
    }
}
