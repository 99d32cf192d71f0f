//! Label placement: picking a side of the element that keeps labels apart.
//!
//! Placement is greedy and order dependent. Each new label is tested against
//! the labels already placed; overlap with other highlighted elements is
//! fine, only label-on-label collisions are avoided.

use dropin_config::LabelConfig;
use dropin_protocols::{Rect, Size, Viewport};
use serde::Serialize;

/// Spacing constants used by [`place_label`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelGeometry {
    /// Gap between a label and its element.
    pub gap: f64,
    /// Padding added around placed labels for collision tests.
    pub label_buffer: f64,
    /// Room needed beyond the label width to prefer a side placement.
    pub side_margin: f64,
    /// Minimum distance from the viewport's top and left edges.
    pub viewport_margin: f64,
    /// How far above the viewport a tall element may start before it is
    /// treated as mid-scroll.
    pub offscreen_tolerance: f64,
}

impl From<&LabelConfig> for LabelGeometry {
    fn from(config: &LabelConfig) -> Self {
        Self {
            gap: config.gap,
            label_buffer: config.label_buffer,
            side_margin: config.side_margin,
            viewport_margin: config.viewport_margin,
            offscreen_tolerance: config.offscreen_tolerance,
        }
    }
}

impl Default for LabelGeometry {
    fn default() -> Self {
        Self::from(&LabelConfig::default())
    }
}

/// Which side of the element a label sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Above,
    Below,
    Right,
    Left,
}

/// Element geometry as the label should see it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    /// Effective element rectangle in viewport coordinates.
    pub rect: Rect,
    /// Vertical scroll offset the viewport has, or will have once an
    /// in-flight scroll lands.
    pub scroll_top: f64,
    pub scroll_left: f64,
}

/// Chosen label position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub side: Side,
    /// Label rectangle in document coordinates.
    pub rect: Rect,
    /// Every candidate collided and the below fallback was used.
    pub collided: bool,
}

/// Resolve the rectangle a label should be placed against.
///
/// Elements taller than the viewport get special treatment. If one sits far
/// off-screen, a scroll to its top is assumed to be in flight: the anchor
/// becomes the full viewport at the element's future position. If it is on
/// screen, only its visible portion is used.
pub fn anchor_for(client_rect: Rect, viewport: &Viewport, geometry: &LabelGeometry) -> LabelAnchor {
    let viewport_height = viewport.height;
    let mut scroll_top = viewport.scroll_y;

    let rect = if client_rect.height > viewport_height {
        if client_rect.top < -geometry.offscreen_tolerance || client_rect.top > viewport_height {
            scroll_top += client_rect.top;
            Rect::new(client_rect.left, 0.0, client_rect.width, viewport_height)
        } else {
            let top = client_rect.top.max(0.0);
            let bottom = client_rect.bottom().min(viewport_height);
            Rect::from_edges(client_rect.left, top, client_rect.right(), bottom)
        }
    } else {
        client_rect
    };

    LabelAnchor {
        rect,
        scroll_top,
        scroll_left: viewport.scroll_x,
    }
}

/// Place a label of `size` next to `anchor`, avoiding the `placed` labels.
///
/// Above is preferred. When above is taken, the fallback order depends on
/// the horizontal room around the element: right first when there is room on
/// the right, otherwise below first. If every side collides the label goes
/// below anyway.
///
/// Each candidate is clamped to the viewport margins before the collision
/// test, so the rectangle checked against `placed` is the one returned.
pub fn place_label(
    size: Size,
    anchor: &LabelAnchor,
    viewport_width: f64,
    placed: &[Rect],
    geometry: &LabelGeometry,
) -> LabelPlacement {
    let element = anchor.rect.translate(anchor.scroll_left, anchor.scroll_top);
    let obstacles: Vec<Rect> = placed
        .iter()
        .map(|rect| rect.inflate(geometry.label_buffer))
        .collect();

    let candidate = |side: Side| -> Rect {
        let (top, left) = match side {
            Side::Above => (element.top - size.height - geometry.gap, element.left),
            Side::Below => (element.bottom() + geometry.gap, element.left),
            Side::Right => (element.top, element.right() + geometry.gap),
            Side::Left => (element.top, element.left - size.width - geometry.gap),
        };
        let top = top.max(anchor.scroll_top + geometry.viewport_margin);
        let left = left.max(geometry.viewport_margin);
        Rect::new(left, top, size.width, size.height)
    };
    let collides = |rect: &Rect| obstacles.iter().any(|obstacle| rect.overlaps(obstacle));

    let space_right = viewport_width - anchor.rect.right();
    let space_left = anchor.rect.left;
    let needed = size.width + geometry.side_margin;

    let fallbacks = if space_right >= needed {
        [Side::Right, Side::Below, Side::Left]
    } else if space_left >= needed {
        [Side::Below, Side::Left, Side::Right]
    } else {
        [Side::Below, Side::Right, Side::Left]
    };

    for side in std::iter::once(Side::Above).chain(fallbacks) {
        let rect = candidate(side);
        if !collides(&rect) {
            return LabelPlacement {
                side,
                rect,
                collided: false,
            };
        }
    }

    LabelPlacement {
        side: Side::Below,
        rect: candidate(Side::Below),
        collided: true,
    }
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod tests;
