use std::collections::HashMap;

use flamefold_protocol::FrameName;
use serde::{Deserialize, Serialize};

use crate::error::FlameError;
use crate::model::folded::FoldedStacks;

/// Name of the synthetic root node.
pub const ROOT_NAME: &str = "all";

/// One distinct call-path prefix in the merged tree.
///
/// Children are sorted by descending `total_count`, ties broken by name,
/// so layouts are reproducible across runs on identical input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTreeNode {
    pub name: FrameName,
    /// Samples whose innermost frame is exactly this node.
    pub self_count: u64,
    /// `self_count` plus all descendants' totals.
    pub total_count: u64,
    pub children: Vec<CallTreeNode>,
}

impl CallTreeNode {
    fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(CallTreeNode::subtree_size).sum::<usize>()
    }
}

/// The weighted call tree merged from all folded records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTree {
    pub root: CallTreeNode,
}

impl CallTree {
    /// Merge all folded records into one tree rooted at [`ROOT_NAME`].
    ///
    /// Each record's count lands on `total_count` of every node along its
    /// path (root included) and on `self_count` of the innermost node
    /// only. A record with no frames aborts the build: the Folder never
    /// emits one, so it signals corruption upstream.
    pub fn build(stacks: &FoldedStacks) -> Result<CallTree, FlameError> {
        let mut root = BuildNode::new(FrameName::from(ROOT_NAME));

        for (index, rec) in stacks.records().iter().enumerate() {
            if rec.frames.is_empty() {
                return Err(FlameError::EmptyFrameSequence { index });
            }
            root.total_count += rec.count;
            let mut cursor = &mut root;
            for frame in &rec.frames {
                cursor = cursor
                    .children
                    .entry(frame.clone())
                    .or_insert_with(|| BuildNode::new(frame.clone()));
                cursor.total_count += rec.count;
            }
            cursor.self_count += rec.count;
        }

        let tree = CallTree {
            root: root.finalize(),
        };
        tree.verify()?;
        Ok(tree)
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }

    /// Check `total == self + Σ children.total` for every node.
    ///
    /// A mismatch is a builder bug; it is reported, never corrected.
    pub fn verify(&self) -> Result<(), FlameError> {
        verify_node(&self.root, self.root.name.as_str())
    }
}

fn verify_node(node: &CallTreeNode, path: &str) -> Result<(), FlameError> {
    let children_total: u64 = node.children.iter().map(|c| c.total_count).sum();
    if node.total_count != node.self_count + children_total {
        return Err(FlameError::TreeInvariantViolation {
            path: path.to_string(),
            total: node.total_count,
            self_count: node.self_count,
            children_total,
        });
    }
    for child in &node.children {
        verify_node(child, &format!("{path};{}", child.name))?;
    }
    Ok(())
}

/// Mutable node used during the merge; children keyed by name so repeated
/// calls to the same function at the same depth land on one node.
struct BuildNode {
    name: FrameName,
    self_count: u64,
    total_count: u64,
    children: HashMap<FrameName, BuildNode>,
}

impl BuildNode {
    fn new(name: FrameName) -> Self {
        Self {
            name,
            self_count: 0,
            total_count: 0,
            children: HashMap::new(),
        }
    }

    /// Freeze into the immutable form, sorting every child list once.
    fn finalize(self) -> CallTreeNode {
        let mut children: Vec<CallTreeNode> = self
            .children
            .into_values()
            .map(BuildNode::finalize)
            .collect();
        children.sort_by(|a, b| {
            b.total_count
                .cmp(&a.total_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        CallTreeNode {
            name: self.name,
            self_count: self.self_count,
            total_count: self.total_count,
            children,
        }
    }
}
