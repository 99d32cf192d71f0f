//! Host document protocol.
//!
//! The inspector never owns the page. Everything it knows about the DOM, and
//! every decoration it adds, goes through [`HostDocument`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Rect, Size, Viewport};
use crate::style::{ComputedStyle, StyleProperty};

/// Non-owning handle to a DOM element.
///
/// Handles stay valid as identities after the element is removed; use
/// [`HostDocument::is_connected`] before acting on one that was captured
/// across a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub u64);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle to a floating label overlay created by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelHandle(pub u64);

/// How `scroll_into_view` moves the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Jump immediately.
    Instant,
    /// Animate; geometry keeps changing until the animation settles.
    Smooth,
}

/// Where the element ends up in the viewport after scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
}

/// Options for [`HostDocument::scroll_into_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl ScrollOptions {
    pub fn new(behavior: ScrollBehavior, block: ScrollBlock) -> Self {
        Self { behavior, block }
    }
}

/// Visual treatment of a floating label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub background: String,
    pub color: String,
    pub z_index: String,
}

/// One childList mutation observed on the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Nodes added by the mutation.
    #[serde(default)]
    pub added: Vec<NodeKey>,
}

/// The live page DOM.
///
/// Reads are cheap and side-effect free. Writes are limited to inline style
/// overrides, scrolling, and label overlays, all of which the inspector can
/// undo.
pub trait HostDocument {
    /// The document's root element (`<body>` for a page).
    fn root(&self) -> NodeKey;

    /// Whether the element is still attached to the document.
    fn is_connected(&self, node: NodeKey) -> bool;

    /// Parent element, or `None` at the root or for a detached node.
    fn parent_element(&self, node: NodeKey) -> Option<NodeKey>;

    /// Element children in document order.
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// Lowercase tag name.
    fn tag_name(&self, node: NodeKey) -> String;

    /// Attribute value, if the attribute is present.
    fn attribute(&self, node: NodeKey, name: &str) -> Option<String>;

    /// Every connected element carrying at least one of `names`, in document order.
    fn elements_with_any_attribute(&self, names: &[&str]) -> Vec<NodeKey>;

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, node: NodeKey) -> String;

    fn computed_style(&self, node: NodeKey) -> ComputedStyle;

    /// Border box relative to the viewport.
    fn bounding_client_rect(&self, node: NodeKey) -> Rect;

    fn viewport(&self) -> Viewport;

    /// Current page URL.
    fn url(&self) -> String;

    /// Inline style value, empty when unset.
    fn inline_style(&self, node: NodeKey, property: StyleProperty) -> String;

    /// Set an inline style value; an empty value clears it.
    fn set_inline_style(&mut self, node: NodeKey, property: StyleProperty, value: &str);

    fn scroll_into_view(&mut self, node: NodeKey, options: ScrollOptions);

    /// Insert a floating label into the document and return its handle.
    fn create_label(&mut self, text: &str, style: &LabelStyle) -> LabelHandle;

    /// Rendered size of an inserted label.
    fn label_size(&self, label: LabelHandle) -> Size;

    /// Place a label at document coordinates.
    fn position_label(&mut self, label: LabelHandle, top: f64, left: f64);

    fn remove_label(&mut self, label: LabelHandle);

    fn has_attribute(&self, node: NodeKey, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn has_any_attribute(&self, node: NodeKey, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_attribute(node, name))
    }

    /// Inclusive containment, like `Node.contains`.
    fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent_element(candidate);
        }
        false
    }

    /// Descendant elements in document order, excluding `node` itself.
    fn descendants(&self, node: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Whether any descendant has one of the given tag names.
    fn has_descendant_with_tag(&self, node: NodeKey, tags: &[&str]) -> bool {
        self.descendants(node).into_iter().any(|descendant| {
            let tag = self.tag_name(descendant);
            tags.iter().any(|wanted| wanted.eq_ignore_ascii_case(&tag))
        })
    }
}
