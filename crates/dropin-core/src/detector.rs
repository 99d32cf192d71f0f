//! Structure detection: rebuilding the block/slot tree from DOM markers.

use std::collections::{HashMap, HashSet};

use dropin_config::{Config, MarkerConfig, VisibilityConfig};
use dropin_protocols::{HostDocument, NodeKey};
use tracing::debug;

use crate::item::ItemId;
use crate::structure::{Block, Slot, Structure};
use crate::visibility::VisibilityFilter;

/// Builds a [`Structure`] from the live document.
///
/// Detection is a pure function of the document at call time; nothing is
/// cached between passes.
#[derive(Debug, Clone)]
pub struct StructureDetector {
    markers: MarkerConfig,
    filter: VisibilityFilter,
}

impl StructureDetector {
    pub fn new(markers: MarkerConfig, visibility: VisibilityConfig) -> Self {
        Self {
            markers,
            filter: VisibilityFilter::new(visibility),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.markers.clone(), config.visibility.clone())
    }

    pub fn markers(&self) -> &MarkerConfig {
        &self.markers
    }

    pub fn show_empty(&self) -> bool {
        self.filter.show_empty()
    }

    /// Affects the visibility filter of subsequent passes only.
    pub fn set_show_empty(&mut self, show_empty: bool) {
        self.filter.set_show_empty(show_empty);
    }

    /// Whether the element carries a block or slot marker.
    pub fn is_marker<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeKey) -> bool {
        doc.has_any_attribute(node, &self.markers.all_attributes())
    }

    /// Whether the element or any descendant carries a marker.
    pub fn contains_marker<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeKey) -> bool {
        self.is_marker(doc, node)
            || doc
                .descendants(node)
                .into_iter()
                .any(|descendant| self.is_marker(doc, descendant))
    }

    /// Display name of a block element, with the placeholder fallback.
    pub fn block_name<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeKey) -> String {
        doc.attribute(node, &self.markers.block_attribute)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.markers.unnamed_block.clone())
    }

    /// Display name of a slot element: the first non-empty slot attribute.
    pub fn slot_name<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeKey) -> String {
        self.markers
            .slot_attributes
            .iter()
            .filter_map(|attribute| doc.attribute(node, attribute))
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| self.markers.unnamed_slot.clone())
    }

    /// Run one detection pass.
    pub fn detect<D: HostDocument + ?Sized>(&self, doc: &D) -> Structure {
        let mut pass = DetectionPass::new(self, doc);
        let mut structure = pass.run();
        structure.assign_ids();
        debug!(
            "Detected {} blocks and {} slots",
            structure.totals.blocks, structure.totals.slots
        );
        structure
    }
}

/// State scoped to a single detection pass.
struct DetectionPass<'a, D: HostDocument + ?Sized> {
    detector: &'a StructureDetector,
    doc: &'a D,
    block_elements: Vec<NodeKey>,
    processed_blocks: HashSet<NodeKey>,
    processed_slots: HashSet<NodeKey>,
    parent_blocks: HashMap<NodeKey, Option<NodeKey>>,
}

impl<'a, D: HostDocument + ?Sized> DetectionPass<'a, D> {
    fn new(detector: &'a StructureDetector, doc: &'a D) -> Self {
        let block_elements =
            doc.elements_with_any_attribute(&[detector.markers.block_attribute.as_str()]);
        Self {
            detector,
            doc,
            block_elements,
            processed_blocks: HashSet::new(),
            processed_slots: HashSet::new(),
            parent_blocks: HashMap::new(),
        }
    }

    fn run(&mut self) -> Structure {
        let mut top_level = Vec::new();
        for element in self.block_elements.clone() {
            if self.nearest_parent_block(element).is_none() && self.block_visible(element) {
                top_level.push(element);
            }
        }
        let top_level = self.sorted_by_position(top_level);

        let mut blocks: Vec<Block> = top_level
            .into_iter()
            .map(|element| self.build_block(element, 0))
            .collect();

        if let Some(standalone) = self.standalone_group() {
            blocks.push(standalone);
        }

        Structure {
            blocks,
            totals: Default::default(),
        }
    }

    fn build_block(&mut self, element: NodeKey, depth: usize) -> Block {
        self.processed_blocks.insert(element);

        let slots = self.direct_slots(element, depth);
        let children = self
            .direct_child_blocks(element)
            .into_iter()
            .map(|child| self.build_block(child, depth + 1))
            .collect();

        Block {
            id: ItemId::Block(0),
            name: self.detector.block_name(self.doc, element),
            element,
            slots,
            children,
            depth,
            standalone: false,
        }
    }

    fn direct_slots(&mut self, block: NodeKey, depth: usize) -> Vec<Slot> {
        let detector = self.detector;
        let slot_attributes = detector.markers.slot_attribute_refs();
        let candidates: Vec<NodeKey> = self
            .doc
            .descendants(block)
            .into_iter()
            .filter(|node| self.doc.has_any_attribute(*node, &slot_attributes))
            .collect();
        let candidates = self.sorted_by_position(candidates);

        let mut slots = Vec::new();
        for slot in candidates {
            if self.processed_slots.contains(&slot) {
                continue;
            }
            if self.nearest_parent_block(slot) != Some(block) {
                debug!("Slot {} belongs to a nested block", slot);
                continue;
            }
            if !self.detector.filter.is_visible(self.doc, slot, None) {
                debug!("Skipping invisible slot {}", slot);
                continue;
            }
            self.processed_slots.insert(slot);

            let nested = self.blocks_in_slot(block, slot);
            let children = nested
                .into_iter()
                .map(|nested_block| self.build_block(nested_block, depth + 1))
                .collect();

            slots.push(Slot {
                id: ItemId::Slot(0),
                name: self.detector.slot_name(self.doc, slot),
                element: slot,
                children,
            });
        }
        slots
    }

    /// Blocks inside `slot` with no block between them and `owner`.
    fn blocks_in_slot(&mut self, owner: NodeKey, slot: NodeKey) -> Vec<NodeKey> {
        let mut nested = Vec::new();
        for candidate in self.block_elements.clone() {
            if self.processed_blocks.contains(&candidate) {
                continue;
            }
            if !self.doc.contains(slot, candidate) {
                continue;
            }
            if self.nearest_parent_block(candidate) != Some(owner) {
                continue;
            }
            if !self.block_visible(candidate) {
                self.processed_blocks.insert(candidate);
                continue;
            }
            nested.push(candidate);
        }
        self.sorted_by_position(nested)
    }

    fn direct_child_blocks(&mut self, parent: NodeKey) -> Vec<NodeKey> {
        let mut children = Vec::new();
        for candidate in self.block_elements.clone() {
            if self.processed_blocks.contains(&candidate) {
                continue;
            }
            if self.nearest_parent_block(candidate) != Some(parent) {
                continue;
            }
            if !self.block_visible(candidate) {
                debug!("Skipping invisible block {}", candidate);
                self.processed_blocks.insert(candidate);
                continue;
            }
            children.push(candidate);
        }
        self.sorted_by_position(children)
    }

    fn standalone_group(&mut self) -> Option<Block> {
        let detector = self.detector;
        let slot_attributes = detector.markers.slot_attribute_refs();
        let mut standalone = Vec::new();
        for slot in self.doc.elements_with_any_attribute(&slot_attributes) {
            if self.processed_slots.contains(&slot) {
                continue;
            }
            let inside_block = self
                .block_elements
                .iter()
                .any(|block| self.doc.contains(*block, slot));
            if inside_block {
                continue;
            }
            if !self.detector.filter.is_visible(self.doc, slot, None) {
                continue;
            }
            self.processed_slots.insert(slot);
            standalone.push(slot);
        }

        if standalone.is_empty() {
            return None;
        }

        let slots = self
            .sorted_by_position(standalone)
            .into_iter()
            .map(|slot| Slot {
                id: ItemId::Slot(0),
                name: self.detector.slot_name(self.doc, slot),
                element: slot,
                children: Vec::new(),
            })
            .collect();

        Some(Block {
            id: ItemId::Block(0),
            name: self.detector.markers.standalone_group_name.clone(),
            element: self.doc.root(),
            slots,
            children: Vec::new(),
            depth: 0,
            standalone: true,
        })
    }

    fn block_visible(&self, element: NodeKey) -> bool {
        let name = self.detector.block_name(self.doc, element);
        self.detector.filter.is_visible(self.doc, element, Some(&name))
    }

    /// Closest strict ancestor carrying the block marker.
    fn nearest_parent_block(&mut self, node: NodeKey) -> Option<NodeKey> {
        if let Some(cached) = self.parent_blocks.get(&node) {
            return *cached;
        }
        let attribute = self.detector.markers.block_attribute.as_str();
        let mut current = self.doc.parent_element(node);
        while let Some(candidate) = current {
            if self.doc.has_attribute(candidate, attribute) {
                break;
            }
            current = self.doc.parent_element(candidate);
        }
        self.parent_blocks.insert(node, current);
        current
    }

    /// Stable sort by vertical document position.
    fn sorted_by_position(&self, nodes: Vec<NodeKey>) -> Vec<NodeKey> {
        let scroll_y = self.doc.viewport().scroll_y;
        let mut keyed: Vec<(f64, NodeKey)> = nodes
            .into_iter()
            .map(|node| (self.doc.bounding_client_rect(node).top + scroll_y, node))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, node)| node).collect()
    }
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
