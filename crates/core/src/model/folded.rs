use std::collections::HashMap;
use std::fmt::Write as _;

use flamefold_protocol::FrameName;
use serde::{Deserialize, Serialize};

/// One distinct call path with its aggregate sample count.
///
/// Frames run outermost to innermost. The Folder only produces records
/// with a non-empty frame sequence and `count >= 1`; the tree builder
/// re-checks the former because violating it means corrupted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldedStack {
    pub frames: Vec<FrameName>,
    pub count: u64,
}

/// Folded records keyed by exact frame sequence, in first-occurrence
/// order.
///
/// Merging counts for identical sequences is commutative and associative,
/// so independent input shards can be folded separately and reduced with
/// [`FoldedStacks::merge`].
#[derive(Debug, Clone, Default)]
pub struct FoldedStacks {
    records: Vec<FoldedStack>,
    index: HashMap<Vec<FrameName>, usize>,
}

impl FoldedStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of a call path, merging with an existing
    /// record for the same exact sequence.
    pub fn add(&mut self, frames: Vec<FrameName>, count: u64) {
        if let Some(&i) = self.index.get(&frames) {
            self.records[i].count += count;
        } else {
            self.index.insert(frames.clone(), self.records.len());
            self.records.push(FoldedStack { frames, count });
        }
    }

    /// Additive reduction of another fold result into this one.
    pub fn merge(&mut self, other: FoldedStacks) {
        for rec in other.records {
            self.add(rec.frames, rec.count);
        }
    }

    pub fn records(&self) -> &[FoldedStack] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all record counts, which equals the number of raw samples
    /// ingested when every raw stack weighs 1.
    pub fn total_samples(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Serialize to collapsed text, one `a;b;c N` line per record.
    ///
    /// Parsing the result with `parsers::collapsed` reproduces these
    /// records exactly.
    pub fn to_collapsed(&self) -> String {
        let mut out = String::new();
        for rec in &self.records {
            for (i, frame) in rec.frames.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                out.push_str(frame.as_str());
            }
            let _ = writeln!(out, " {}", rec.count);
        }
        out
    }
}

impl<'a> IntoIterator for &'a FoldedStacks {
    type Item = &'a FoldedStack;
    type IntoIter = std::slice::Iter<'a, FoldedStack>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
