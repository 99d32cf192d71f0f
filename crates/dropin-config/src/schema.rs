//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::loader::ConfigLoader;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub markers: MarkerConfig,

    #[serde(default)]
    pub visibility: VisibilityConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub labels: LabelConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// DOM attributes that mark blocks and slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Attribute carrying a block's display name.
    #[serde(default = "default_block_attribute")]
    pub block_attribute: String,

    /// Attributes carrying a slot's name; the first non-empty one wins.
    #[serde(default = "default_slot_attributes")]
    pub slot_attributes: Vec<String>,

    #[serde(default = "default_unnamed_block")]
    pub unnamed_block: String,

    #[serde(default = "default_unnamed_slot")]
    pub unnamed_slot: String,

    /// Name of the synthetic block grouping slots outside every block.
    #[serde(default = "default_standalone_group_name")]
    pub standalone_group_name: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            block_attribute: default_block_attribute(),
            slot_attributes: default_slot_attributes(),
            unnamed_block: default_unnamed_block(),
            unnamed_slot: default_unnamed_slot(),
            standalone_group_name: default_standalone_group_name(),
        }
    }
}

impl MarkerConfig {
    /// Block and slot attributes together, for mutation relevance checks.
    pub fn all_attributes(&self) -> Vec<&str> {
        std::iter::once(self.block_attribute.as_str())
            .chain(self.slot_attributes.iter().map(String::as_str))
            .collect()
    }

    pub fn slot_attribute_refs(&self) -> Vec<&str> {
        self.slot_attributes.iter().map(String::as_str).collect()
    }
}

fn default_block_attribute() -> String {
    "data-block-name".to_string()
}

fn default_slot_attributes() -> Vec<String> {
    vec!["data-slot".to_string(), "data-slot-key".to_string()]
}

fn default_unnamed_block() -> String {
    "Unnamed Block".to_string()
}

fn default_unnamed_slot() -> String {
    "Unnamed Slot".to_string()
}

fn default_standalone_group_name() -> String {
    "Standalone Slots".to_string()
}

/// Visibility filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Show markers with no rendered content (only explicitly hidden ones are filtered).
    #[serde(default)]
    pub show_empty_slots: bool,

    /// Block names containing one of these (case-insensitive) are kept when
    /// they have any extent at all.
    #[serde(default = "default_structural_keywords")]
    pub structural_keywords: Vec<String>,

    /// Tags that count as embedded media content.
    #[serde(default = "default_media_tags")]
    pub media_tags: Vec<String>,

    /// Tags that count as form-control content.
    #[serde(default = "default_control_tags")]
    pub control_tags: Vec<String>,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            show_empty_slots: false,
            structural_keywords: default_structural_keywords(),
            media_tags: default_media_tags(),
            control_tags: default_control_tags(),
        }
    }
}

fn default_structural_keywords() -> Vec<String> {
    vec!["header".to_string(), "footer".to_string()]
}

fn default_media_tags() -> Vec<String> {
    ["img", "svg", "video", "canvas", "iframe"]
        .iter()
        .map(|tag| tag.to_string())
        .collect()
}

fn default_control_tags() -> Vec<String> {
    ["input", "button", "select", "textarea"]
        .iter()
        .map(|tag| tag.to_string())
        .collect()
}

/// Delays for deferred work, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Quiet period after a relevant DOM mutation before the structure reloads.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Wait after an instant scroll before placing a label.
    #[serde(default = "default_scroll_settle")]
    pub scroll_settle_ms: u64,

    /// Wait after a smooth scroll before placing a label.
    #[serde(default = "default_smooth_scroll")]
    pub smooth_scroll_ms: u64,

    /// Wait for new page content after navigation.
    #[serde(default = "default_page_load")]
    pub page_load_ms: u64,

    /// URL poll interval for single-page-app navigation.
    #[serde(default = "default_nav_poll")]
    pub nav_poll_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            scroll_settle_ms: default_scroll_settle(),
            smooth_scroll_ms: default_smooth_scroll(),
            page_load_ms: default_page_load(),
            nav_poll_ms: default_nav_poll(),
        }
    }
}

impl TimingConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn smooth_scroll(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_ms)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn nav_poll(&self) -> Duration {
        Duration::from_millis(self.nav_poll_ms)
    }
}

fn default_debounce() -> u64 {
    300
}

fn default_scroll_settle() -> u64 {
    50
}

fn default_smooth_scroll() -> u64 {
    400
}

fn default_page_load() -> u64 {
    500
}

fn default_nav_poll() -> u64 {
    500
}

/// Highlight styling for one marker type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeStyle {
    pub border: String,
    pub outline: String,
    pub background_color: String,
    pub label_background: String,
}

/// Highlight styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_block_style")]
    pub block: TypeStyle,

    #[serde(default = "default_slot_style")]
    pub slot: TypeStyle,

    /// z-index forced onto highlighted elements.
    #[serde(default = "default_z_index")]
    pub z_index: String,

    #[serde(default = "default_label_z_index")]
    pub label_z_index: String,

    #[serde(default = "default_label_color")]
    pub label_color: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            block: default_block_style(),
            slot: default_slot_style(),
            z_index: default_z_index(),
            label_z_index: default_label_z_index(),
            label_color: default_label_color(),
        }
    }
}

fn default_block_style() -> TypeStyle {
    TypeStyle {
        border: "2px solid #6366f1".to_string(),
        outline: "2px solid rgba(99, 102, 241, 0.3)".to_string(),
        background_color: "rgba(99, 102, 241, 0.08)".to_string(),
        label_background: "#6366f1".to_string(),
    }
}

fn default_slot_style() -> TypeStyle {
    TypeStyle {
        border: "2px dashed #22c55e".to_string(),
        outline: "2px dashed rgba(34, 197, 94, 0.4)".to_string(),
        background_color: "rgba(34, 197, 94, 0.08)".to_string(),
        label_background: "#22c55e".to_string(),
    }
}

fn default_z_index() -> String {
    "10000".to_string()
}

fn default_label_z_index() -> String {
    "999998".to_string()
}

fn default_label_color() -> String {
    "white".to_string()
}

/// Label placement geometry, in CSS pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Gap between a label and its element.
    #[serde(default = "default_gap")]
    pub gap: f64,

    /// Padding around placed labels when testing for collisions.
    #[serde(default = "default_label_buffer")]
    pub label_buffer: f64,

    /// Extra room beyond the label width required to prefer a side placement.
    #[serde(default = "default_side_margin")]
    pub side_margin: f64,

    /// Minimum distance from the viewport's top and left edges.
    #[serde(default = "default_viewport_margin")]
    pub viewport_margin: f64,

    /// How far above the viewport a tall element's top may sit before it is
    /// considered mid-scroll.
    #[serde(default = "default_offscreen_tolerance")]
    pub offscreen_tolerance: f64,

    /// Average glyph advance used by documents that estimate label width.
    #[serde(default = "default_char_width")]
    pub char_width: f64,

    /// Horizontal padding inside a label.
    #[serde(default = "default_padding_x")]
    pub padding_x: f64,

    /// Rendered label height.
    #[serde(default = "default_label_height")]
    pub label_height: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            gap: default_gap(),
            label_buffer: default_label_buffer(),
            side_margin: default_side_margin(),
            viewport_margin: default_viewport_margin(),
            offscreen_tolerance: default_offscreen_tolerance(),
            char_width: default_char_width(),
            padding_x: default_padding_x(),
            label_height: default_label_height(),
        }
    }
}

fn default_gap() -> f64 {
    4.0
}

fn default_label_buffer() -> f64 {
    6.0
}

fn default_side_margin() -> f64 {
    20.0
}

fn default_viewport_margin() -> f64 {
    4.0
}

fn default_offscreen_tolerance() -> f64 {
    100.0
}

fn default_char_width() -> f64 {
    6.5
}

fn default_padding_x() -> f64 {
    8.0
}

fn default_label_height() -> f64 {
    19.0
}

/// Where panel preferences are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Storage path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.path))
    }
}

fn default_storage_path() -> String {
    "~/.dropin-inspector/preferences.json".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
