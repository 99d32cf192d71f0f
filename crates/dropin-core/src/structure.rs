//! Detection result: the block/slot tree and its totals.

use dropin_protocols::NodeKey;
use serde::Serialize;

use crate::item::{ItemId, ItemKind};

/// A structural block and everything attributed to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub id: ItemId,
    pub name: String,
    #[serde(skip)]
    pub element: NodeKey,
    /// Slots whose nearest ancestor block is this one.
    pub slots: Vec<Slot>,
    /// Blocks whose nearest ancestor block is this one and that do not sit
    /// inside one of its slots.
    pub children: Vec<Block>,
    pub depth: usize,
    /// Synthetic group collecting slots outside every block.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub standalone: bool,
}

/// A named insertion point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub id: ItemId,
    pub name: String,
    #[serde(skip)]
    pub element: NodeKey,
    /// Blocks nested inside this slot.
    pub children: Vec<Block>,
}

/// Aggregate counts of one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub blocks: usize,
    pub slots: usize,
}

/// Flattened view of one block or slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub element: NodeKey,
}

/// Result of one detection pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Structure {
    pub blocks: Vec<Block>,
    pub totals: Totals,
}

impl Structure {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number the tree and compute totals.
    ///
    /// Order: block, then each of its slots (recursing into the slot's nested
    /// blocks right after the slot), then its child blocks.
    pub(crate) fn assign_ids(&mut self) {
        let mut totals = Totals::default();
        assign_block_ids(&mut self.blocks, &mut totals);
        self.totals = totals;
    }

    /// Find a block or slot by id, anywhere in the tree.
    pub fn find(&self, id: ItemId) -> Option<Item> {
        let mut found = None;
        visit(&self.blocks, &mut |item| {
            if found.is_none() && item.id == id {
                found = Some(item);
            }
        });
        found
    }

    /// Live element for an id, if the id is part of this structure.
    pub fn find_element(&self, id: ItemId) -> Option<NodeKey> {
        self.find(id).map(|item| item.element)
    }

    /// Every block and slot in id-assignment order.
    pub fn items(&self) -> Vec<Item> {
        let mut items = Vec::with_capacity(self.totals.blocks + self.totals.slots);
        visit(&self.blocks, &mut |item| items.push(item));
        items
    }

    /// Ids that can be expanded in a tree view: blocks with slots or child
    /// blocks, and slots with nested blocks.
    pub fn expandable_ids(&self) -> Vec<ItemId> {
        let mut ids = Vec::new();
        collect_expandable(&self.blocks, &mut ids);
        ids
    }

    /// One-line summary, e.g. `3 blocks • 5 slots`.
    pub fn summary(&self) -> String {
        format!("{} blocks • {} slots", self.totals.blocks, self.totals.slots)
    }

    /// Count items of one kind; matches `totals` after id assignment.
    pub fn count(&self, kind: ItemKind) -> usize {
        self.items().iter().filter(|item| item.id.kind() == kind).count()
    }
}

fn assign_block_ids(blocks: &mut [Block], totals: &mut Totals) {
    for block in blocks {
        block.id = ItemId::Block(totals.blocks);
        totals.blocks += 1;
        for slot in &mut block.slots {
            slot.id = ItemId::Slot(totals.slots);
            totals.slots += 1;
            assign_block_ids(&mut slot.children, totals);
        }
        assign_block_ids(&mut block.children, totals);
    }
}

fn visit(blocks: &[Block], f: &mut dyn FnMut(Item)) {
    for block in blocks {
        f(Item {
            id: block.id,
            name: block.name.clone(),
            element: block.element,
        });
        for slot in &block.slots {
            f(Item {
                id: slot.id,
                name: slot.name.clone(),
                element: slot.element,
            });
            visit(&slot.children, f);
        }
        visit(&block.children, f);
    }
}

fn collect_expandable(blocks: &[Block], ids: &mut Vec<ItemId>) {
    for block in blocks {
        if !block.slots.is_empty() || !block.children.is_empty() {
            ids.push(block.id);
        }
        for slot in &block.slots {
            if !slot.children.is_empty() {
                ids.push(slot.id);
                collect_expandable(&slot.children, ids);
            }
        }
        collect_expandable(&block.children, ids);
    }
}

#[cfg(test)]
#[path = "structure_tests.rs"]
mod tests;
