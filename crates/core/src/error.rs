use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline errors.
///
/// Malformed raw blocks are not represented here: the Folder skips them,
/// logs a warning, and reports the skip count alongside its output.
#[derive(Debug, Error)]
pub enum FlameError {
    /// A folded record with no frames reached the tree builder. The Folder
    /// never produces these, so this signals upstream corruption.
    #[error("folded record {index} has an empty frame sequence")]
    EmptyFrameSequence { index: usize },

    /// Post-build structural check failed: a node's total does not equal
    /// its self count plus its children's totals.
    #[error(
        "call tree invariant violated at \"{path}\": \
         total {total} != self {self_count} + children {children_total}"
    )]
    TreeInvariantViolation {
        path: String,
        total: u64,
        self_count: u64,
        children_total: u64,
    },

    /// The tree holds more nodes than the configured maximum.
    #[error("flame graph has {count} nodes, above the configured maximum of {max}")]
    CanvasOverflow { count: usize, max: usize },

    /// The rendered document could not be written.
    #[error("cannot write render target {path}: {source}")]
    RenderTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] crate::parsers::ParseError),
}
