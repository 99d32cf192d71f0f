//! Typed identifiers for detected blocks and slots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ItemIdError;

/// Whether an item is a block or a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Block,
    Slot,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Block => "block",
            ItemKind::Slot => "slot",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a block or slot within one detection pass.
///
/// Blocks and slots are numbered by independent counters, so `Block(0)` and
/// `Slot(0)` coexist. Displays and serializes as `block-<n>` / `slot-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ItemId {
    Block(usize),
    Slot(usize),
}

impl ItemId {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemId::Block(_) => ItemKind::Block,
            ItemId::Slot(_) => ItemKind::Slot,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ItemId::Block(index) | ItemId::Slot(index) => *index,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind(), self.index())
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = s
            .split_once('-')
            .ok_or_else(|| ItemIdError::Malformed(s.to_string()))?;
        let index: usize = index
            .parse()
            .map_err(|_| ItemIdError::InvalidIndex(s.to_string()))?;
        match kind {
            "block" => Ok(ItemId::Block(index)),
            "slot" => Ok(ItemId::Slot(index)),
            other => Err(ItemIdError::UnknownKind {
                id: s.to_string(),
                kind: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}
