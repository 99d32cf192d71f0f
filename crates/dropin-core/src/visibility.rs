//! Visibility filter: which markers count as rendered on the page.

use dropin_config::VisibilityConfig;
use dropin_protocols::{HostDocument, NodeKey};

/// Decides whether a marked element has a visual presence worth reporting.
#[derive(Debug, Clone)]
pub struct VisibilityFilter {
    config: VisibilityConfig,
}

impl VisibilityFilter {
    pub fn new(config: VisibilityConfig) -> Self {
        Self { config }
    }

    pub fn show_empty(&self) -> bool {
        self.config.show_empty_slots
    }

    pub fn set_show_empty(&mut self, show_empty: bool) {
        self.config.show_empty_slots = show_empty;
    }

    /// Whether `node` should appear in the structure.
    ///
    /// `block_name` is only passed for blocks; names containing a structural
    /// keyword are kept as long as they have any extent.
    pub fn is_visible<D: HostDocument + ?Sized>(
        &self,
        doc: &D,
        node: NodeKey,
        block_name: Option<&str>,
    ) -> bool {
        if doc.computed_style(node).is_hidden() {
            return false;
        }

        if self.config.show_empty_slots {
            return true;
        }

        let rect = doc.bounding_client_rect(node);

        if let Some(name) = block_name {
            if self.is_structural(name) {
                return rect.height > 0.0 || rect.width > 0.0;
            }
        }

        if rect.height == 0.0 || rect.width == 0.0 {
            return false;
        }

        self.has_visible_content(doc, node)
    }

    /// Whether the element renders anything meaningful.
    ///
    /// Child elements are inspected one level deep only.
    pub fn has_visible_content<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeKey) -> bool {
        if !doc.text_content(node).trim().is_empty() {
            return true;
        }

        let media: Vec<&str> = self.config.media_tags.iter().map(String::as_str).collect();
        if doc.has_descendant_with_tag(node, &media) {
            return true;
        }

        let controls: Vec<&str> = self.config.control_tags.iter().map(String::as_str).collect();
        if doc.has_descendant_with_tag(node, &controls) {
            return true;
        }

        if doc.computed_style(node).has_background_image() {
            return true;
        }

        doc.children(node).into_iter().any(|child| {
            let rect = doc.bounding_client_rect(child);
            rect.width > 0.0 && rect.height > 0.0 && !doc.computed_style(child).is_hidden()
        })
    }

    fn is_structural(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.config
            .structural_keywords
            .iter()
            .any(|keyword| name.contains(&keyword.to_lowercase()))
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
