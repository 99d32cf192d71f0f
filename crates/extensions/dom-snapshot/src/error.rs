//! Error types for the snapshot document.

use dropin_protocols::NodeKey;
use thiserror::Error;

/// Errors that can occur while loading or editing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error reading a fixture.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture is not valid JSON or does not match the schema.
    #[error("Fixture parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The node does not exist or is no longer attached.
    #[error("Unknown or detached node: {0}")]
    UnknownNode(NodeKey),
}
