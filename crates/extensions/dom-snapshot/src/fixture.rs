//! Serializable page fixture.

use std::collections::BTreeMap;

use dropin_protocols::{ComputedStyle, Rect, Viewport};
use serde::{Deserialize, Serialize};

/// A page snapshot: URL, viewport and element tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub viewport: Viewport,

    pub root: NodeSpec,
}

fn default_url() -> String {
    "about:blank".to_string()
}

/// One element of the fixture tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Text owned directly by this element.
    #[serde(default)]
    pub text: String,

    /// Border box in document coordinates.
    #[serde(default)]
    pub rect: Rect,

    #[serde(default)]
    pub style: ComputedStyle,

    /// Inline style values keyed by CSS property name.
    #[serde(default)]
    pub inline_style: BTreeMap<String, String>,

    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn rect(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.rect = Rect::new(left, top, width, height);
        self
    }

    pub fn style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    pub fn inline(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.inline_style.insert(property.into(), value.into());
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}
