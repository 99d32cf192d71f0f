//! # Dropin Core
//!
//! The engine behind the inspector panel:
//!
//! - [`StructureDetector`] rebuilds the block/slot tree from attribute markers
//! - [`VisibilityFilter`] decides which markers have a rendered presence
//! - [`HighlightEngine`] decorates selected elements and places their labels
//! - [`place_label`] is the collision-avoiding label placement on its own
//!
//! Everything reads and writes the page through
//! [`dropin_protocols::HostDocument`].

pub mod detector;
pub mod error;
pub mod highlight;
pub mod item;
pub mod outline;
pub mod placement;
pub mod structure;
pub mod visibility;

pub use detector::StructureDetector;
pub use error::ItemIdError;
pub use highlight::{HighlightEngine, HighlightOutcome, PendingLabel};
pub use item::{ItemId, ItemKind};
pub use outline::render_outline;
pub use placement::{anchor_for, place_label, LabelAnchor, LabelGeometry, LabelPlacement, Side};
pub use structure::{Block, Item, Slot, Structure, Totals};
pub use visibility::VisibilityFilter;
