//! # Dropin Runloop
//!
//! The inspector session: everything between the panel UI and the engine.
//!
//! - [`Inspector`] - panel lifecycle, mutation and navigation watchers,
//!   deferred labels, and preference persistence
//! - [`TimerQueue`] - deadline scheduling on a virtual clock
//! - [`InspectorDriver`] - a tokio event loop that feeds an inspector from
//!   channels and wall-clock time

pub mod driver;
pub mod error;
pub mod events;
pub mod inspector;
pub mod timer;

pub use driver::{InspectorDriver, InspectorHandle};
pub use error::{SessionError, SessionResult};
pub use events::{InspectorCommand, InspectorTask, PanelEvent, PanelPosition, PanelState};
pub use inspector::Inspector;
pub use timer::{TimerId, TimerQueue};
