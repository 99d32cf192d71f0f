//! Arena-backed snapshot document.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use dropin_protocols::{
    ComputedStyle, HostDocument, LabelHandle, LabelStyle, NodeKey, Rect, ScrollBehavior,
    ScrollBlock, ScrollOptions, Size, StyleProperty, Viewport,
};
use tracing::debug;

use crate::error::SnapshotError;
use crate::fixture::{NodeSpec, PageFixture};

/// Font metrics used to size labels, since nothing is actually rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMetrics {
    pub char_width: f64,
    pub padding_x: f64,
    pub height: f64,
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            char_width: 6.5,
            padding_x: 8.0,
            height: 19.0,
        }
    }
}

/// A label overlay inserted into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub style: LabelStyle,
    pub size: Size,
    /// Document-coordinate `(top, left)`, once positioned.
    pub position: Option<(f64, f64)>,
}

impl PlacedLabel {
    /// Document-coordinate rectangle, once positioned.
    pub fn rect(&self) -> Option<Rect> {
        self.position
            .map(|(top, left)| Rect::new(left, top, self.size.width, self.size.height))
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    rect: Rect,
    style: ComputedStyle,
    inline: HashMap<StyleProperty, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    connected: bool,
}

/// In-memory [`HostDocument`] backed by an arena of nodes.
#[derive(Debug, Clone)]
pub struct SnapshotDocument {
    nodes: Vec<NodeData>,
    root: usize,
    url: String,
    viewport: Viewport,
    pending_scroll: Option<(f64, f64)>,
    labels: HashMap<u64, PlacedLabel>,
    next_label: u64,
    metrics: LabelMetrics,
    scroll_log: Vec<(NodeKey, ScrollOptions)>,
}

impl SnapshotDocument {
    /// Build a document from a parsed fixture.
    pub fn from_fixture(fixture: PageFixture) -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            root: 0,
            url: fixture.url,
            viewport: fixture.viewport,
            pending_scroll: None,
            labels: HashMap::new(),
            next_label: 1,
            metrics: LabelMetrics::default(),
            scroll_log: Vec::new(),
        };
        document.root = document.insert_spec(fixture.root, None);
        document
    }

    /// Parse a fixture from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let fixture: PageFixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Load a fixture file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let document = Self::from_json(&content)?;
        debug!(
            "Loaded snapshot {} with {} nodes",
            path.as_ref().display(),
            document.nodes.len()
        );
        Ok(document)
    }

    /// Build a document directly from a root spec with a default viewport.
    pub fn from_root(url: impl Into<String>, viewport: Viewport, root: NodeSpec) -> Self {
        Self::from_fixture(PageFixture {
            url: url.into(),
            viewport,
            root,
        })
    }

    pub fn with_label_metrics(mut self, metrics: LabelMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    fn insert_spec(&mut self, spec: NodeSpec, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        let mut inline = HashMap::new();
        for (name, value) in spec.inline_style {
            match StyleProperty::from_css_name(&name) {
                Some(property) => {
                    inline.insert(property, value);
                }
                None => debug!("Ignoring untracked inline style '{}'", name),
            }
        }
        self.nodes.push(NodeData {
            tag: spec.tag.to_ascii_lowercase(),
            attributes: spec.attributes,
            text: spec.text,
            rect: spec.rect,
            style: spec.style,
            inline,
            parent,
            children: Vec::new(),
            connected: true,
        });
        for child in spec.children {
            let child_index = self.insert_spec(child, Some(index));
            self.nodes[index].children.push(child_index);
        }
        index
    }

    fn node(&self, key: NodeKey) -> Option<&NodeData> {
        self.nodes.get(key.0 as usize)
    }

    fn live_node(&self, key: NodeKey) -> Result<usize, SnapshotError> {
        match self.node(key) {
            Some(node) if node.connected => Ok(key.0 as usize),
            _ => Err(SnapshotError::UnknownNode(key)),
        }
    }

    /// Append a new subtree under `parent`, as a page script would.
    pub fn append_child(&mut self, parent: NodeKey, spec: NodeSpec) -> Result<NodeKey, SnapshotError> {
        let parent_index = self.live_node(parent)?;
        let index = self.insert_spec(spec, Some(parent_index));
        self.nodes[parent_index].children.push(index);
        Ok(NodeKey(index as u64))
    }

    /// Remove a node and its subtree from the document.
    ///
    /// The handles stay valid as identities but report not connected.
    pub fn detach(&mut self, node: NodeKey) -> Result<(), SnapshotError> {
        let index = self.live_node(node)?;
        if let Some(parent) = self.nodes[index].parent.take() {
            self.nodes[parent].children.retain(|child| *child != index);
        }
        let mut stack = vec![index];
        while let Some(next) = stack.pop() {
            self.nodes[next].connected = false;
            stack.extend(self.nodes[next].children.iter().copied());
        }
        Ok(())
    }

    /// Change the page URL without touching the tree (history.pushState).
    pub fn navigate(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Replace the whole tree, as a full page load would.
    pub fn replace_root(&mut self, url: impl Into<String>, root: NodeSpec) {
        for node in &mut self.nodes {
            node.connected = false;
            node.parent = None;
        }
        self.url = url.into();
        self.pending_scroll = None;
        self.viewport.scroll_x = 0.0;
        self.viewport.scroll_y = 0.0;
        self.root = self.insert_spec(root, None);
    }

    /// Move the viewport immediately, cancelling any scroll in flight.
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.pending_scroll = None;
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
    }

    /// Target of a smooth scroll that has not landed yet.
    pub fn pending_scroll(&self) -> Option<(f64, f64)> {
        self.pending_scroll
    }

    /// Complete an in-flight smooth scroll.
    pub fn finish_scroll(&mut self) {
        if let Some((x, y)) = self.pending_scroll.take() {
            self.viewport.scroll_x = x;
            self.viewport.scroll_y = y;
        }
    }

    /// Update an element's document-coordinate box.
    pub fn set_rect(&mut self, node: NodeKey, rect: Rect) -> Result<(), SnapshotError> {
        let index = self.live_node(node)?;
        self.nodes[index].rect = rect;
        Ok(())
    }

    /// First connected element whose attribute equals `value`.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeKey> {
        self.connected_in_order()
            .into_iter()
            .find(|index| self.nodes[*index].attributes.get(name).map(String::as_str) == Some(value))
            .map(|index| NodeKey(index as u64))
    }

    pub fn label(&self, handle: LabelHandle) -> Option<&PlacedLabel> {
        self.labels.get(&handle.0)
    }

    /// Every label currently in the document, in creation order.
    pub fn labels(&self) -> Vec<&PlacedLabel> {
        let mut handles: Vec<&u64> = self.labels.keys().collect();
        handles.sort();
        handles.into_iter().filter_map(|handle| self.labels.get(handle)).collect()
    }

    /// Label with the given text, if present.
    pub fn label_with_text(&self, text: &str) -> Option<&PlacedLabel> {
        self.labels().into_iter().find(|label| label.text == text)
    }

    /// Every `scroll_into_view` request received so far.
    pub fn scroll_log(&self) -> &[(NodeKey, ScrollOptions)] {
        &self.scroll_log
    }

    fn connected_in_order(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(self.nodes[index].children.iter().rev().copied());
        }
        out
    }

    fn document_height(&self) -> f64 {
        self.connected_in_order()
            .into_iter()
            .map(|index| self.nodes[index].rect.bottom())
            .fold(0.0, f64::max)
    }
}

impl HostDocument for SnapshotDocument {
    fn root(&self) -> NodeKey {
        NodeKey(self.root as u64)
    }

    fn is_connected(&self, node: NodeKey) -> bool {
        self.node(node).is_some_and(|data| data.connected)
    }

    fn parent_element(&self, node: NodeKey) -> Option<NodeKey> {
        self.node(node)
            .and_then(|data| data.parent)
            .map(|parent| NodeKey(parent as u64))
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.node(node)
            .map(|data| data.children.iter().map(|child| NodeKey(*child as u64)).collect())
            .unwrap_or_default()
    }

    fn tag_name(&self, node: NodeKey) -> String {
        self.node(node).map(|data| data.tag.clone()).unwrap_or_default()
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.node(node).and_then(|data| data.attributes.get(name).cloned())
    }

    fn elements_with_any_attribute(&self, names: &[&str]) -> Vec<NodeKey> {
        self.connected_in_order()
            .into_iter()
            .filter(|index| {
                let attributes = &self.nodes[*index].attributes;
                names.iter().any(|name| attributes.contains_key(*name))
            })
            .map(|index| NodeKey(index as u64))
            .collect()
    }

    fn text_content(&self, node: NodeKey) -> String {
        let Some(data) = self.node(node) else {
            return String::new();
        };
        let mut text = data.text.clone();
        for child in &data.children {
            text.push_str(&self.text_content(NodeKey(*child as u64)));
        }
        text
    }

    fn computed_style(&self, node: NodeKey) -> ComputedStyle {
        self.node(node).map(|data| data.style.clone()).unwrap_or_default()
    }

    fn bounding_client_rect(&self, node: NodeKey) -> Rect {
        match self.node(node) {
            Some(data) if data.connected => data
                .rect
                .translate(-self.viewport.scroll_x, -self.viewport.scroll_y),
            _ => Rect::default(),
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn inline_style(&self, node: NodeKey, property: StyleProperty) -> String {
        self.node(node)
            .and_then(|data| data.inline.get(&property).cloned())
            .unwrap_or_default()
    }

    fn set_inline_style(&mut self, node: NodeKey, property: StyleProperty, value: &str) {
        let Some(data) = self.nodes.get_mut(node.0 as usize) else {
            return;
        };
        if value.is_empty() {
            data.inline.remove(&property);
        } else {
            data.inline.insert(property, value.to_string());
        }
    }

    fn scroll_into_view(&mut self, node: NodeKey, options: ScrollOptions) {
        self.scroll_log.push((node, options));
        let Some(data) = self.node(node).filter(|data| data.connected) else {
            return;
        };
        let rect = data.rect;
        let target = match options.block {
            ScrollBlock::Start => rect.top,
            ScrollBlock::Center => rect.top + rect.height / 2.0 - self.viewport.height / 2.0,
        };
        let max_scroll = (self.document_height() - self.viewport.height).max(0.0);
        let target = target.clamp(0.0, max_scroll);
        let x = self.viewport.scroll_x;

        match options.behavior {
            ScrollBehavior::Instant => {
                self.pending_scroll = None;
                self.viewport.scroll_y = target;
            }
            ScrollBehavior::Smooth => {
                self.pending_scroll = Some((x, target));
            }
        }
    }

    fn create_label(&mut self, text: &str, style: &LabelStyle) -> LabelHandle {
        let handle = LabelHandle(self.next_label);
        self.next_label += 1;
        let width = text.chars().count() as f64 * self.metrics.char_width + self.metrics.padding_x * 2.0;
        self.labels.insert(
            handle.0,
            PlacedLabel {
                text: text.to_string(),
                style: style.clone(),
                size: Size::new(width, self.metrics.height),
                position: None,
            },
        );
        handle
    }

    fn label_size(&self, label: LabelHandle) -> Size {
        self.labels
            .get(&label.0)
            .map(|placed| placed.size)
            .unwrap_or_default()
    }

    fn position_label(&mut self, label: LabelHandle, top: f64, left: f64) {
        if let Some(placed) = self.labels.get_mut(&label.0) {
            placed.position = Some((top, left));
        }
    }

    fn remove_label(&mut self, label: LabelHandle) {
        self.labels.remove(&label.0);
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
