//! Messages into and out of an inspector session.

use std::collections::BTreeSet;

use dropin_core::{ItemId, Structure};
use serde::{Deserialize, Serialize};

/// Requests from the panel UI (or the toolbar trigger).
#[derive(Debug, Clone, PartialEq)]
pub enum InspectorCommand {
    /// The single opaque toolbar trigger.
    TogglePanel,
    ShowPanel,
    HidePanel,
    /// Re-run detection and re-render.
    Refresh,
    ToggleHighlight { id: ItemId, name: String },
    ClearAllHighlights,
    ToggleAllHighlights,
    ToggleEmptySlots,
    ToggleExpand { id: ItemId },
    ToggleCollapseAll,
    ToggleMinimize,
    /// End of a panel drag.
    MovePanel { top: f64, left: f64 },
}

/// State changes the panel UI renders.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    PanelShown,
    PanelHidden,
    StructureLoaded { structure: Structure, summary: String },
    HighlightsChanged { active: Vec<ItemId> },
    EmptyFilterChanged { show_empty: bool },
    ExpansionChanged { expanded: Vec<ItemId> },
    MinimizeChanged { minimized: bool },
}

/// Work deferred onto the session's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorTask {
    /// Create the label for a highlight once its scroll settled.
    CreateLabel(ItemId),
    /// Debounced reload after relevant mutations.
    RefreshStructure,
    /// Periodic URL comparison.
    NavPoll,
    /// Reload after a URL change was noticed by polling.
    PageLoaded,
    /// Teardown and reload after a history pop.
    PopState,
}

/// Persisted panel position, in viewport pixels.
///
/// `right` is always cleared once the panel has been dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub top: String,
    pub left: String,
    #[serde(default = "default_right")]
    pub right: String,
}

fn default_right() -> String {
    "auto".to_string()
}

impl PanelPosition {
    pub fn new(top: f64, left: f64) -> Self {
        Self {
            top: format!("{}px", top),
            left: format!("{}px", left),
            right: default_right(),
        }
    }
}

/// Panel-side state owned by the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub visible: bool,
    pub minimized: bool,
    pub position: Option<PanelPosition>,
    pub expanded: BTreeSet<ItemId>,
}

impl PanelState {
    pub fn is_expanded(&self, id: ItemId) -> bool {
        self.expanded.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_position_format() {
        let position = PanelPosition::new(120.0, 40.5);
        assert_eq!(position.top, "120px");
        assert_eq!(position.left, "40.5px");
        assert_eq!(position.right, "auto");
    }

    #[test]
    fn test_panel_position_serialization() {
        let json = serde_json::to_value(PanelPosition::new(10.0, 20.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"top": "10px", "left": "20px", "right": "auto"})
        );
    }

    #[test]
    fn test_panel_position_missing_right() {
        let position: PanelPosition =
            serde_json::from_str(r#"{"top": "5px", "left": "6px"}"#).unwrap();
        assert_eq!(position.right, "auto");
    }

    #[test]
    fn test_panel_state_default() {
        let state = PanelState::default();
        assert!(!state.visible);
        assert!(!state.minimized);
        assert!(state.position.is_none());
        assert!(!state.is_expanded(ItemId::Block(0)));
    }
}
