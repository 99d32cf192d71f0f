//! Computed and inline style types.

use serde::{Deserialize, Serialize};

/// Computed `display` value, reduced to what the inspector distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
    #[serde(other)]
    Other,
}

/// Computed `visibility` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// The subset of an element's computed style the visibility filter reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    #[serde(default)]
    pub display: Display,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// `background-image`; `None` stands for `none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::default(),
            visibility: Visibility::default(),
            opacity: default_opacity(),
            background_image: None,
        }
    }
}

impl ComputedStyle {
    /// Explicitly hidden: `display:none`, `visibility:hidden`, or `opacity:0`.
    pub fn is_hidden(&self) -> bool {
        self.display == Display::None
            || self.visibility == Visibility::Hidden
            || self.opacity == 0.0
    }

    /// Whether a non-`none` background image is set.
    pub fn has_background_image(&self) -> bool {
        self.background_image
            .as_deref()
            .is_some_and(|image| !image.is_empty() && image != "none")
    }
}

/// Inline style properties the highlight engine overrides and restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleProperty {
    Border,
    Outline,
    BackgroundColor,
    Position,
    ZIndex,
}

impl StyleProperty {
    /// Every saved property, in restore order.
    pub const ALL: [StyleProperty; 5] = [
        StyleProperty::Border,
        StyleProperty::Outline,
        StyleProperty::BackgroundColor,
        StyleProperty::Position,
        StyleProperty::ZIndex,
    ];

    /// CSS property name.
    pub fn css_name(&self) -> &'static str {
        match self {
            StyleProperty::Border => "border",
            StyleProperty::Outline => "outline",
            StyleProperty::BackgroundColor => "background-color",
            StyleProperty::Position => "position",
            StyleProperty::ZIndex => "z-index",
        }
    }

    /// Parse a CSS property name; accepts the camelCase DOM spelling too.
    pub fn from_css_name(name: &str) -> Option<Self> {
        match name {
            "border" => Some(StyleProperty::Border),
            "outline" => Some(StyleProperty::Outline),
            "background-color" | "backgroundColor" => Some(StyleProperty::BackgroundColor),
            "position" => Some(StyleProperty::Position),
            "z-index" | "zIndex" => Some(StyleProperty::ZIndex),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_not_hidden() {
        assert!(!ComputedStyle::default().is_hidden());
    }

    #[test]
    fn test_hidden_variants() {
        let display_none = ComputedStyle {
            display: Display::None,
            ..Default::default()
        };
        let visibility_hidden = ComputedStyle {
            visibility: Visibility::Hidden,
            ..Default::default()
        };
        let transparent = ComputedStyle {
            opacity: 0.0,
            ..Default::default()
        };
        assert!(display_none.is_hidden());
        assert!(visibility_hidden.is_hidden());
        assert!(transparent.is_hidden());
    }

    #[test]
    fn test_collapse_is_not_hidden() {
        let style = ComputedStyle {
            visibility: Visibility::Collapse,
            ..Default::default()
        };
        assert!(!style.is_hidden());
    }

    #[test]
    fn test_background_image() {
        let mut style = ComputedStyle::default();
        assert!(!style.has_background_image());
        style.background_image = Some("none".to_string());
        assert!(!style.has_background_image());
        style.background_image = Some("url(hero.png)".to_string());
        assert!(style.has_background_image());
    }

    #[test]
    fn test_deserialize_unknown_display() {
        let style: ComputedStyle =
            serde_json::from_str(r#"{"display": "table-cell", "opacity": 0.5}"#).unwrap();
        assert_eq!(style.display, Display::Other);
        assert_eq!(style.opacity, 0.5);
        assert_eq!(style.visibility, Visibility::Visible);
    }

    #[test]
    fn test_css_names() {
        assert_eq!(StyleProperty::BackgroundColor.css_name(), "background-color");
        assert_eq!(StyleProperty::ZIndex.css_name(), "z-index");
        assert_eq!(StyleProperty::ALL.len(), 5);
    }

    #[test]
    fn test_from_css_name() {
        for property in StyleProperty::ALL {
            assert_eq!(StyleProperty::from_css_name(property.css_name()), Some(property));
        }
        assert_eq!(StyleProperty::from_css_name("zIndex"), Some(StyleProperty::ZIndex));
        assert_eq!(StyleProperty::from_css_name("color"), None);
    }
}
