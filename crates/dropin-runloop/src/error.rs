//! Error types for the inspector session.

use dropin_protocols::StorageError;
use thiserror::Error;

/// Errors that can occur while driving an inspector session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The driver has stopped and no longer accepts input.
    #[error("Inspector channel closed")]
    ChannelClosed,

    /// Preference storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stored preference had an unexpected shape.
    #[error("Invalid preference {key}: {message}")]
    InvalidPreference { key: String, message: String },
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_closed_display() {
        assert_eq!(SessionError::ChannelClosed.to_string(), "Inspector channel closed");
    }

    #[test]
    fn test_storage_error_from() {
        let err: SessionError = StorageError::Unavailable("offline".to_string()).into();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn test_invalid_preference_display() {
        let err = SessionError::InvalidPreference {
            key: "dropinInspector_position".to_string(),
            message: "expected object".to_string(),
        };
        assert!(err.to_string().contains("dropinInspector_position"));
    }
}
