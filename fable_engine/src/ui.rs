//! Window layout primitives.
//!
//! An [`AnchorRect`] pins a child rectangle's edges to fractional anchor
//! positions inside a parent; when the parent resizes, each child edge
//! keeps its offset from its anchor. This is how message windows and
//! balloons track the screen across resolutions.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle as `[x0, y0, x1, y1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Fractional anchor positions `[ax0, ay0, ax1, ay1]` in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Anchor {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// A child rect expressed as per-edge offsets from its anchors.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorRect {
    anchor: Anchor,
    offsets: Rect,
}

impl AnchorRect {
    /// Capture `child` (parent-relative) against a parent of `parent_size`.
    pub fn new(child: Rect, anchor: Anchor, parent_size: (f64, f64)) -> Self {
        let (pw, ph) = parent_size;
        Self {
            anchor,
            offsets: Rect {
                x0: child.x0 - anchor.x0 * pw,
                y0: child.y0 - anchor.y0 * ph,
                x1: child.x1 - anchor.x1 * pw,
                y1: child.y1 - anchor.y1 * ph,
            },
        }
    }

    /// Absolute child rect inside the (possibly resized) `parent`.
    pub fn resolve(&self, parent: Rect) -> Rect {
        Rect {
            x0: parent.x0 + self.anchor.x0 * parent.width() + self.offsets.x0,
            y0: parent.y0 + self.anchor.y0 * parent.height() + self.offsets.y0,
            x1: parent.x0 + self.anchor.x1 * parent.width() + self.offsets.x1,
            y1: parent.y0 + self.anchor.y1 * parent.height() + self.offsets.y1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(anchor: Anchor) -> AnchorRect {
        // parent [10,10,20,20], child [1,1,9,9] relative
        AnchorRect::new(Rect::new(1.0, 1.0, 9.0, 9.0), anchor, (10.0, 10.0))
    }

    #[test]
    fn corner_anchors_track_edges() {
        let child = layout(Anchor::new(0.0, 0.0, 1.0, 1.0));
        let resolved = child.resolve(Rect::new(10.0, 10.0, 30.0, 30.0));
        assert_eq!(resolved, Rect::new(11.0, 11.0, 29.0, 29.0));
    }

    #[test]
    fn center_anchor_keeps_size() {
        let child = layout(Anchor::new(0.5, 0.5, 0.5, 0.5));
        let resolved = child.resolve(Rect::new(10.0, 10.0, 30.0, 30.0));
        assert_eq!(resolved, Rect::new(16.0, 16.0, 24.0, 24.0));
    }

    #[test]
    fn bottom_strip_anchor() {
        let child = layout(Anchor::new(0.0, 1.0, 1.0, 1.0));
        let resolved = child.resolve(Rect::new(10.0, 10.0, 30.0, 30.0));
        assert_eq!(resolved, Rect::new(11.0, 21.0, 29.0, 29.0));
    }

    #[test]
    fn unresized_parent_reproduces_child() {
        let child = layout(Anchor::new(0.0, 0.0, 1.0, 1.0));
        let resolved = child.resolve(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(resolved, Rect::new(11.0, 11.0, 19.0, 19.0));
    }
}
