use flamefold_protocol::FrameName;
use tracing::warn;

use crate::options::FrameOrder;
use crate::parsers::FoldReport;

/// Fold raw stack-sample blocks into weighted records.
///
/// Input is a sequence of blocks, one frame name per line, separated by
/// blank lines; each block weighs one sample. Blocks are validated
/// independently: a block that is not UTF-8 text, or contains control
/// characters, is skipped with a warning rather than failing the whole
/// input. Empty input folds to an empty record set.
///
/// `FrameOrder::LeafFirst` reverses each block so records always store
/// frames outermost-first.
pub fn fold_raw(data: &[u8], order: FrameOrder) -> FoldReport {
    let mut report = FoldReport::default();
    let mut block: Vec<&[u8]> = Vec::new();

    for line in data.split(|&b| b == b'\n') {
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            flush_block(&mut block, order, &mut report);
        } else {
            block.push(line);
        }
    }
    flush_block(&mut block, order, &mut report);

    report
}

fn flush_block(block: &mut Vec<&[u8]>, order: FrameOrder, report: &mut FoldReport) {
    if block.is_empty() {
        return;
    }
    let lines = std::mem::take(block);
    match decode_block(&lines) {
        Some(mut frames) => {
            if order == FrameOrder::LeafFirst {
                frames.reverse();
            }
            report.stacks.add(frames, 1);
        }
        None => {
            warn!(lines = lines.len(), "skipping malformed stack block");
            report.skipped += 1;
        }
    }
}

/// Decode one block's lines into frame names, or `None` if any line is
/// not clean UTF-8 text.
fn decode_block(lines: &[&[u8]]) -> Option<Vec<FrameName>> {
    let mut frames = Vec::with_capacity(lines.len());
    for raw in lines {
        let line = std::str::from_utf8(raw).ok()?.trim();
        if line.chars().any(|c| c.is_control() && c != '\t') {
            return None;
        }
        if !line.is_empty() {
            frames.push(FrameName::from(line));
        }
    }
    Some(frames)
}
