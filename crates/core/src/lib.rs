//! Core pipeline for flamefold.
//!
//! Four stages, each a pure transformation of the previous stage's fully
//! materialized output:
//!
//! 1. Folder ([`parsers`]) — raw stack blocks or collapsed text into
//!    weighted [`model::FoldedStacks`].
//! 2. Tree Builder ([`model::call_tree`]) — folded records merged into one
//!    weighted [`model::CallTree`].
//! 3. Layout Engine ([`views::flame`]) — proportional-width rectangles,
//!    one [`flamefold_protocol::FrameRect`] per node.
//! 4. Renderer ([`svg`]) — a self-contained interactive SVG document.
//!
//! The core performs no I/O; callers hand it fully-read bytes and write
//! the returned document themselves.

pub mod color;
pub mod error;
pub mod model;
pub mod options;
pub mod parsers;
pub mod svg;
pub mod views;

pub use error::FlameError;
pub use options::{ColorMode, FlameOptions, FrameOrder};

/// Run the whole pipeline on one input buffer and return the SVG document.
pub fn generate(input: &[u8], opts: &FlameOptions) -> Result<String, FlameError> {
    let report = parsers::parse_auto(input, opts.frame_order)?;
    let tree = model::CallTree::build(&report.stacks)?;
    let rects = views::flame::layout_flame(&tree, opts)?;
    Ok(svg::render_svg(&rects, tree.root.total_count, opts))
}
