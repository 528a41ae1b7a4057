use serde::{Deserialize, Serialize};

use crate::frame_name::FrameName;

/// One positioned call-tree node, the layout engine's output record.
///
/// `x` and `width` are in canvas pixels; `depth` counts rows from the
/// synthetic root (row 0). The renderer derives the y coordinate from
/// `depth`, the frame height, and the flame/icicle orientation.
///
/// The layout emits rects in depth-first order, so a renderer that draws
/// them sequentially paints parents before their children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRect {
    pub name: FrameName,
    /// Full semicolon-joined call path from the root, for hover and search.
    pub path: String,
    pub depth: u32,
    pub x: f64,
    pub width: f64,
    /// Samples in this node and all descendants.
    pub total_count: u64,
    /// Samples whose innermost frame is exactly this node.
    pub self_count: u64,
    /// Too narrow for the configured minimum-visible width. Still present
    /// so totals and search stay exact; renderers skip its label.
    pub elided: bool,
}

impl FrameRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Share of the root total, in percent.
    pub fn percent(&self, root_total: u64) -> f64 {
        if root_total == 0 {
            0.0
        } else {
            self.total_count as f64 * 100.0 / root_total as f64
        }
    }
}
