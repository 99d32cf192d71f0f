//! # Dropin Config
//!
//! Configuration for the dropin inspector: marker attributes, visibility
//! heuristics, timing of deferred work, highlight styling, and label geometry.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
