pub mod call_tree;
pub mod folded;

pub use call_tree::{CallTree, CallTreeNode, ROOT_NAME};
pub use folded::{FoldedStack, FoldedStacks};
