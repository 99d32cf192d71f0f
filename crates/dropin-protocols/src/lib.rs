//! # Dropin Protocols
//!
//! Interface definitions shared by every dropin inspector crate.
//! Contains only traits and plain data types - no implementations.
//!
//! ## Core Traits
//!
//! - [`HostDocument`] - The live page DOM the inspector reads and decorates
//! - [`PreferenceStore`] - Key/value storage for panel preferences

pub mod document;
pub mod error;
pub mod geometry;
pub mod storage;
pub mod style;

pub use document::{
    HostDocument, LabelHandle, LabelStyle, MutationRecord, NodeKey, ScrollBehavior, ScrollBlock,
    ScrollOptions,
};
pub use error::StorageError;
pub use geometry::{Rect, Size, Viewport};
pub use storage::{keys, PreferenceStore};
pub use style::{ComputedStyle, Display, StyleProperty, Visibility};
