//! Plain-text tree view of a structure.

use std::fmt::Write;

use crate::item::ItemId;
use crate::structure::{Block, Slot, Structure};

/// Render the structure as an indented outline.
///
/// Each line shows the id, the name, and the number of direct children when
/// there are any. Ids in `active` are marked with `*`.
pub fn render_outline(structure: &Structure, active: &[ItemId]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", structure.summary());
    if structure.is_empty() {
        out.push_str("No dropins found on this page\n");
        return out;
    }
    for block in &structure.blocks {
        write_block(&mut out, block, 0, active);
    }
    out
}

fn write_block(out: &mut String, block: &Block, level: usize, active: &[ItemId]) {
    let count = block.slots.len() + block.children.len();
    let mut line = format!("{}▸ {} {}", indent(level), block.id, block.name);
    if block.standalone {
        line.push_str(" (standalone)");
    }
    push_suffix(&mut line, count, active.contains(&block.id));
    let _ = writeln!(out, "{}", line);

    for slot in &block.slots {
        write_slot(out, slot, level + 1, active);
    }
    for child in &block.children {
        write_block(out, child, level + 1, active);
    }
}

fn write_slot(out: &mut String, slot: &Slot, level: usize, active: &[ItemId]) {
    let mut line = format!("{}◦ {} {}", indent(level), slot.id, slot.name);
    push_suffix(&mut line, slot.children.len(), active.contains(&slot.id));
    let _ = writeln!(out, "{}", line);

    for child in &slot.children {
        write_block(out, child, level + 1, active);
    }
}

fn push_suffix(line: &mut String, count: usize, is_active: bool) {
    if count > 0 {
        let _ = write!(line, " ({})", count);
    }
    if is_active {
        line.push_str(" *");
    }
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}
