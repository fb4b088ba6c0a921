//! Visibility resolver.
//!
//! The visible sequence is a cut through the tree: a collapsed node stands in
//! for its whole subtree, an expanded node is replaced by the cut of its
//! children, and leaves are always shown. A node and any of its ancestors are
//! never visible at the same time.

use super::node::NodeIndex;
use super::table::LabelTree;
use crate::dataset::ShadowTree;

/// Pre-order cut of the whole tree from the current expand flags.
pub fn determine_visible(tree: &LabelTree) -> Vec<NodeIndex> {
    let mut visible = Vec::with_capacity(tree.len());
    for &root in tree.roots() {
        collect(tree, root, &mut visible);
    }
    visible
}

/// Cut of the subtree below `index`, `index` itself excluded unless it is a
/// leaf.
pub fn determine_visible_under(tree: &LabelTree, index: NodeIndex) -> Vec<NodeIndex> {
    let node = tree.node(index);
    if node.is_leaf() {
        return vec![index];
    }
    let mut visible = Vec::new();
    for &child in &node.children {
        collect(tree, child, &mut visible);
    }
    visible
}

fn collect(tree: &LabelTree, index: NodeIndex, out: &mut Vec<NodeIndex>) {
    let node = tree.node(index);
    if node.is_leaf() || !node.expand.is_expanded() {
        out.push(index);
        return;
    }
    for &child in &node.children {
        collect(tree, child, out);
    }
}

/// The visible sequence right after a build or restore.
///
/// This is the full cut, truncated to the focused subtree when one node is in
/// focus.
pub fn initial_visible(tree: &LabelTree) -> Vec<NodeIndex> {
    match tree.focused() {
        Some(focus) => determine_visible_under(tree, focus),
        None => determine_visible(tree),
    }
}

/// Look up the value stored for `index` in a dataset's shadow tree.
///
/// Descends root → … → `index` following each node's position among its
/// siblings. Pure: the shadow tree is never modified.
pub fn resolve(tree: &LabelTree, index: NodeIndex, shadow: &ShadowTree) -> Option<f64> {
    shadow.value_at(&tree.path(index))
}

/// Check the cut invariant: no visible node has a visible ancestor and every
/// visible non-root has an expanded parent.
pub fn is_valid_cut(tree: &LabelTree, visible: &[NodeIndex]) -> bool {
    let mut shown = vec![false; tree.len()];
    for &index in visible {
        if !tree.contains(index) || shown[index.slot()] {
            return false;
        }
        shown[index.slot()] = true;
    }
    visible.iter().all(|&index| {
        let parent_ok = tree
            .node(index)
            .parent
            .is_none_or(|p| tree.node(p).expand.is_expanded());
        parent_ok && tree.ancestors(index).all(|a| !shown[a.slot()])
    })
}
