pub mod collapsed;
pub mod raw;

use thiserror::Error;

use crate::model::FoldedStacks;
use crate::options::FrameOrder;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("collapsed input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result of folding one input: the records plus how many malformed
/// blocks or lines were skipped along the way.
#[derive(Debug, Default)]
pub struct FoldReport {
    pub stacks: FoldedStacks,
    pub skipped: usize,
}

impl FoldReport {
    /// Additive reduction of a shard's report into this one.
    pub fn merge(&mut self, other: FoldReport) {
        self.stacks.merge(other.stacks);
        self.skipped += other.skipped;
    }
}

/// Detect the input flavor and fold it.
///
/// Collapsed text is recognized when every early non-comment line ends in
/// an integer count; anything else is treated as raw blank-line-separated
/// stack blocks. `order` only applies to raw blocks — collapsed lines are
/// root-first by definition.
pub fn parse_auto(data: &[u8], order: FrameOrder) -> Result<FoldReport, ParseError> {
    if looks_collapsed(data) {
        collapsed::parse_collapsed(data)
    } else {
        Ok(raw::fold_raw(data, order))
    }
}

fn looks_collapsed(data: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(data) else {
        return false;
    };
    let mut seen = 0;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((_, count)) = line.rsplit_once(char::is_whitespace) else {
            return false;
        };
        if count.parse::<u64>().is_err() {
            return false;
        }
        seen += 1;
        if seen >= 10 {
            break;
        }
    }
    seen > 0
}
