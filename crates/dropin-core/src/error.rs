//! Core error types.

use thiserror::Error;

/// A block or slot id string that could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemIdError {
    #[error("Malformed item id '{0}': expected block-<n> or slot-<n>")]
    Malformed(String),

    #[error("Unknown item kind '{kind}' in id '{id}'")]
    UnknownKind { id: String, kind: String },

    #[error("Invalid index in item id '{0}'")]
    InvalidIndex(String),
}
