//! Highlight engine: element decoration and floating labels.
//!
//! The engine owns all highlight session state: which ids are active, the
//! inline styles it overwrote, and where each label was placed. Element
//! handles captured here may go stale; every deferred step re-checks them.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use dropin_config::{Config, HighlightConfig, TypeStyle};
use dropin_protocols::{
    HostDocument, LabelHandle, LabelStyle, NodeKey, Rect, ScrollBehavior, ScrollBlock,
    ScrollOptions, StyleProperty,
};
use tracing::debug;

use crate::detector::StructureDetector;
use crate::item::{ItemId, ItemKind};
use crate::placement::{anchor_for, place_label, LabelGeometry};
use crate::structure::Structure;

/// A label that should be created once a scroll has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLabel {
    pub id: ItemId,
    pub delay: Duration,
}

/// Result of a highlight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOutcome {
    /// The id is not in the current structure; nothing changed.
    NotFound,
    /// The highlight was removed.
    Removed,
    /// Highlighted and labelled immediately.
    Labelled,
    /// Highlighted; the label waits for the scroll to settle.
    Pending(PendingLabel),
}

impl HighlightOutcome {
    pub fn pending(&self) -> Option<PendingLabel> {
        match self {
            HighlightOutcome::Pending(pending) => Some(*pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct HighlightRecord {
    element: NodeKey,
    saved: Vec<(StyleProperty, String)>,
    text: String,
}

/// Applies and removes highlights and keeps labels from overlapping.
#[derive(Debug)]
pub struct HighlightEngine {
    styles: HighlightConfig,
    geometry: LabelGeometry,
    scroll_settle: Duration,
    smooth_scroll: Duration,
    active: HashSet<ItemId>,
    records: HashMap<ItemId, HighlightRecord>,
    labels: HashMap<ItemId, LabelHandle>,
    positions: HashMap<ItemId, Rect>,
}

impl HighlightEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            styles: config.highlight.clone(),
            geometry: LabelGeometry::from(&config.labels),
            scroll_settle: config.timing.scroll_settle(),
            smooth_scroll: config.timing.smooth_scroll(),
            active: HashSet::new(),
            records: HashMap::new(),
            labels: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    pub fn is_active(&self, id: ItemId) -> bool {
        self.active.contains(&id)
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Active ids, sorted.
    pub fn active_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.active.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Document-coordinate rectangle of an id's label.
    pub fn label_position(&self, id: ItemId) -> Option<Rect> {
        self.positions.get(&id).copied()
    }

    /// Every placed label, sorted by id.
    pub fn label_positions(&self) -> Vec<(ItemId, Rect)> {
        let mut positions: Vec<(ItemId, Rect)> =
            self.positions.iter().map(|(id, rect)| (*id, *rect)).collect();
        positions.sort_by_key(|(id, _)| *id);
        positions
    }

    /// Flip an id between highlighted and not.
    pub fn toggle<D: HostDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        detector: &StructureDetector,
        id: ItemId,
        name: &str,
    ) -> HighlightOutcome {
        if self.active.contains(&id) {
            self.remove_highlight(doc, id);
            return HighlightOutcome::Removed;
        }
        let structure = detector.detect(&*doc);
        self.apply_highlight(doc, &structure, id, name, false)
    }

    /// Decorate the element for `id` and arrange for its label.
    ///
    /// Unless `skip_scroll` is set the element is scrolled into view and the
    /// label is returned as pending, to be created once the scroll settles.
    pub fn apply_highlight<D: HostDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        structure: &Structure,
        id: ItemId,
        text: &str,
        skip_scroll: bool,
    ) -> HighlightOutcome {
        let Some(element) = structure.find_element(id) else {
            debug!("No element for {}, ignoring highlight", id);
            return HighlightOutcome::NotFound;
        };
        if !doc.is_connected(element) {
            debug!("Element for {} is detached, ignoring highlight", id);
            return HighlightOutcome::NotFound;
        }

        if let Some(previous) = self.records.remove(&id) {
            restore(doc, &previous);
        }
        let saved = StyleProperty::ALL
            .iter()
            .map(|property| (*property, doc.inline_style(element, *property)))
            .collect();

        let style = self.type_style(id.kind()).clone();
        doc.set_inline_style(element, StyleProperty::Border, &style.border);
        doc.set_inline_style(element, StyleProperty::Outline, &style.outline);
        doc.set_inline_style(element, StyleProperty::BackgroundColor, &style.background_color);
        doc.set_inline_style(element, StyleProperty::Position, "relative");
        doc.set_inline_style(element, StyleProperty::ZIndex, &self.styles.z_index);

        self.active.insert(id);
        self.records.insert(
            id,
            HighlightRecord {
                element,
                saved,
                text: text.to_string(),
            },
        );

        if skip_scroll {
            self.create_label(doc, id);
            return HighlightOutcome::Labelled;
        }

        let rect = doc.bounding_client_rect(element);
        let viewport_height = doc.viewport().height;
        let (options, delay) = if rect.height > viewport_height {
            (
                ScrollOptions::new(ScrollBehavior::Instant, ScrollBlock::Start),
                self.scroll_settle,
            )
        } else if rect.top.abs() > viewport_height {
            (
                ScrollOptions::new(ScrollBehavior::Instant, ScrollBlock::Center),
                self.scroll_settle,
            )
        } else {
            (
                ScrollOptions::new(ScrollBehavior::Smooth, ScrollBlock::Center),
                self.smooth_scroll,
            )
        };
        debug!("Scrolling to {} ({:?}), label in {:?}", id, options.behavior, delay);
        doc.scroll_into_view(element, options);

        HighlightOutcome::Pending(PendingLabel { id, delay })
    }

    /// Create or replace the label for `id` from current geometry.
    ///
    /// A no-op returning `false` when the highlight was removed in the
    /// meantime or its element is gone.
    pub fn create_label<D: HostDocument + ?Sized>(&mut self, doc: &mut D, id: ItemId) -> bool {
        let Some(record) = self.records.get(&id) else {
            debug!("Highlight {} no longer active, skipping label", id);
            return false;
        };
        if !doc.is_connected(record.element) {
            debug!("Element for {} detached before its label was placed", id);
            return false;
        }
        let element = record.element;
        let text = record.text.clone();

        if let Some(existing) = self.labels.remove(&id) {
            doc.remove_label(existing);
        }
        self.positions.remove(&id);

        let label_style = LabelStyle {
            background: self.type_style(id.kind()).label_background.clone(),
            color: self.styles.label_color.clone(),
            z_index: self.styles.label_z_index.clone(),
        };
        let handle = doc.create_label(&text, &label_style);
        let size = doc.label_size(handle);
        let viewport = doc.viewport();
        let anchor = anchor_for(doc.bounding_client_rect(element), &viewport, &self.geometry);
        let placed: Vec<Rect> = self.positions.values().copied().collect();
        let placement = place_label(size, &anchor, viewport.width, &placed, &self.geometry);
        if placement.collided {
            debug!("Every side collides for {}, using below", id);
        }

        doc.position_label(handle, placement.rect.top, placement.rect.left);
        self.labels.insert(id, handle);
        self.positions.insert(id, placement.rect);
        true
    }

    /// Restore the element's styles and drop its label.
    pub fn remove_highlight<D: HostDocument + ?Sized>(&mut self, doc: &mut D, id: ItemId) {
        self.active.remove(&id);
        if let Some(record) = self.records.remove(&id) {
            restore(doc, &record);
        }
        if let Some(label) = self.labels.remove(&id) {
            doc.remove_label(label);
        }
        self.positions.remove(&id);
    }

    /// Remove every highlight and label.
    pub fn clear_all<D: HostDocument + ?Sized>(&mut self, doc: &mut D) {
        for (_, record) in self.records.drain() {
            restore(doc, &record);
        }
        for (_, label) in self.labels.drain() {
            doc.remove_label(label);
        }
        self.positions.clear();
        self.active.clear();
    }

    /// Highlight every block and slot in `structure` without scrolling.
    ///
    /// Returns how many items were newly highlighted.
    pub fn highlight_all<D: HostDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        structure: &Structure,
    ) -> usize {
        let mut count = 0;
        for item in structure.items() {
            if self.active.contains(&item.id) {
                continue;
            }
            if self.apply_highlight(doc, structure, item.id, &item.name, true)
                == HighlightOutcome::Labelled
            {
                count += 1;
            }
        }
        count
    }

    /// Clear everything if anything is active, otherwise highlight everything.
    pub fn toggle_all<D: HostDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        detector: &StructureDetector,
    ) -> usize {
        if self.has_active() {
            self.clear_all(doc);
            return 0;
        }
        let structure = detector.detect(&*doc);
        self.highlight_all(doc, &structure)
    }

    /// Forget all highlight state after the page changed underneath.
    ///
    /// Labels are removed; styles are not restored since the elements they
    /// belonged to are gone or reused.
    pub fn reset_for_navigation<D: HostDocument + ?Sized>(&mut self, doc: &mut D) {
        for (_, label) in self.labels.drain() {
            doc.remove_label(label);
        }
        self.positions.clear();
        self.records.clear();
        self.active.clear();
    }

    fn type_style(&self, kind: ItemKind) -> &TypeStyle {
        match kind {
            ItemKind::Block => &self.styles.block,
            ItemKind::Slot => &self.styles.slot,
        }
    }
}

fn restore<D: HostDocument + ?Sized>(doc: &mut D, record: &HighlightRecord) {
    for (property, value) in &record.saved {
        doc.set_inline_style(record.element, *property, value);
    }
}

#[cfg(test)]
#[path = "highlight_tests.rs"]
mod tests;
