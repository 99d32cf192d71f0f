//! Preference stores for the dropin inspector.
//!
//! - [`JsonFilePreferenceStore`] keeps every key in a single JSON object on
//!   disk, loaded once and rewritten on each `set`.
//! - [`InMemoryPreferenceStore`] keeps them in memory only.
//!
//! ```json
//! {
//!   "dropinInspector_visible": true,
//!   "dropinInspector_position": { "top": "120px", "left": "40px", "right": "auto" },
//!   "dropinInspector_showEmpty": false
//! }
//! ```

mod error;
mod file;
mod memory;

pub use error::PrefsError;
pub use file::JsonFilePreferenceStore;
pub use memory::InMemoryPreferenceStore;
