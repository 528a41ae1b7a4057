/// How rectangle fill colors are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Stable hash of the frame name; the same function gets the same
    /// color in every branch.
    #[default]
    ByFunction,
    /// Color cycles with stack depth.
    ByDepth,
    /// Hash of the leading path component, so a whole crate or package
    /// shares a hue family.
    ByPackage,
}

/// The frame-order convention of raw stack blocks.
///
/// Reversing this silently inverts the whole tree, so it is an explicit
/// setting rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameOrder {
    /// First line of a block is the outermost frame.
    #[default]
    RootFirst,
    /// First line is the innermost frame (perf script, bpftrace).
    LeafFirst,
}

/// Rendering and layout configuration. All fields have documented
/// defaults; construct with `FlameOptions::default()` and override.
#[derive(Debug, Clone)]
pub struct FlameOptions {
    /// Canvas width in pixels.
    pub width: f64,
    /// Document height; derived from the deepest stack when `None`.
    pub height: Option<f64>,
    /// Height of one frame row in pixels.
    pub frame_height: f64,
    pub font_size: f64,
    /// Rectangles narrower than this are flagged elided: still emitted
    /// and searchable, never labeled.
    pub min_width: f64,
    pub color_mode: ColorMode,
    pub title: String,
    /// Extra line under the title. The renderer embeds no timestamps on
    /// its own; put one here if you want it in the document.
    pub subtitle: Option<String>,
    /// `false` = flame (root at the bottom), `true` = icicle (root at
    /// the top).
    pub inverted: bool,
    /// Fill used to highlight search matches.
    pub search_color: String,
    pub frame_order: FrameOrder,
    /// Fail with `CanvasOverflow` if the tree exceeds this many nodes.
    /// `None` disables the guard.
    pub max_nodes: Option<usize>,
}

impl Default for FlameOptions {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: None,
            frame_height: 16.0,
            font_size: 12.0,
            min_width: 0.1,
            color_mode: ColorMode::default(),
            title: "Flame Graph".to_string(),
            subtitle: None,
            inverted: false,
            search_color: "#e600e6".to_string(),
            frame_order: FrameOrder::default(),
            max_nodes: None,
        }
    }
}
