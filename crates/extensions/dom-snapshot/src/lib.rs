//! In-memory host document for the dropin inspector.
//!
//! Loads a page snapshot from JSON and exposes it through
//! [`dropin_protocols::HostDocument`]. Element rectangles are stored in
//! document coordinates; client rectangles are derived from the current
//! scroll offsets, so scrolling moves elements the way a browser would.
//!
//! ## Fixture Format
//!
//! ```json
//! {
//!   "url": "https://shop.example/",
//!   "viewport": { "width": 1280, "height": 720, "scroll_y": 0 },
//!   "root": {
//!     "tag": "body",
//!     "rect": { "left": 0, "top": 0, "width": 1280, "height": 2000 },
//!     "children": [
//!       {
//!         "attributes": { "data-block-name": "Hero" },
//!         "rect": { "left": 0, "top": 0, "width": 1280, "height": 400 },
//!         "children": [
//!           { "attributes": { "data-slot": "cta" }, "text": "Buy now",
//!             "rect": { "left": 40, "top": 300, "width": 200, "height": 40 } }
//!         ]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Smooth scrolls do not land immediately: the target is held as pending
//! until [`SnapshotDocument::finish_scroll`] is called, which lets tests
//! observe geometry while a scroll animation is still in flight.

mod document;
mod error;
mod fixture;

pub use document::{LabelMetrics, PlacedLabel, SnapshotDocument};
pub use error::SnapshotError;
pub use fixture::{NodeSpec, PageFixture};
