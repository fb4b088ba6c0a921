//! LabelTree - the flat node table.
//!
//! All nodes of the hierarchy live in one arena in pre-order. Relationships are
//! index-based (parent back-pointers and ordered child lists), so ancestor walks
//! are O(depth) and nothing is reference counted.

use super::node::{ExpandState, Node, NodeIndex};

/// The flat node table plus its root set.
#[derive(Debug, Clone, Default)]
pub struct LabelTree {
    nodes: Vec<Node>,
    roots: Vec<NodeIndex>,
}

impl LabelTree {
    pub(crate) fn from_parts(nodes: Vec<Node>, roots: Vec<NodeIndex>) -> Self {
        Self { nodes, roots }
    }

    /// Number of nodes in the table.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.slot())
    }

    pub fn contains(&self, index: NodeIndex) -> bool {
        index.slot() < self.nodes.len()
    }

    /// Panicking accessor for indices that came out of this table.
    pub(crate) fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.slot()]
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index.slot()]
    }

    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len() as u32).map(NodeIndex)
    }

    /// Iterate the ancestors of `index`, closest first.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(index).and_then(|node| node.parent),
        }
    }

    /// Root-to-node chain of indices, `index` included.
    pub fn lineage(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut chain: Vec<NodeIndex> = self.ancestors(index).collect();
        chain.reverse();
        chain.push(index);
        chain
    }

    /// Root-to-node chain of sibling positions, used to address shadow trees.
    pub fn path(&self, index: NodeIndex) -> Vec<usize> {
        self.lineage(index)
            .into_iter()
            .map(|i| self.node(i).rel_index)
            .collect()
    }

    /// Look a node up by its sibling-position path.
    pub fn find_by_path(&self, path: &[usize]) -> Option<NodeIndex> {
        let (&first, rest) = path.split_first()?;
        let mut current = *self.roots.get(first)?;
        for &rel in rest {
            current = *self.node(current).children.get(rel)?;
        }
        Some(current)
    }

    /// True if `ancestor` is a strict ancestor of `index`.
    pub fn is_descendant_of(&self, index: NodeIndex, ancestor: NodeIndex) -> bool {
        self.ancestors(index).any(|a| a == ancestor)
    }

    /// All strict descendants of `index` in pre-order.
    pub fn descendants(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.node(index).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        out
    }

    /// The focused node, if any.
    pub fn focused(&self) -> Option<NodeIndex> {
        self.indices().find(|&i| self.node(i).expand.is_focus())
    }

    /// True if a strict descendant of `index` is focused.
    pub fn has_focused_descendant(&self, index: NodeIndex) -> bool {
        self.focused()
            .is_some_and(|focus| self.is_descendant_of(focus, index))
    }

    /// True if some node other than `index` and its ancestors is focused.
    pub fn has_focus_outside_lineage(&self, index: NodeIndex) -> bool {
        self.indices().any(|i| {
            self.node(i).expand.is_focus() && i != index && !self.is_descendant_of(index, i)
        })
    }

    pub(crate) fn set_expand(&mut self, index: NodeIndex, expand: ExpandState) {
        self.node_mut(index).expand = expand;
    }
}

/// Iterator over a node's ancestors, closest first.
pub struct Ancestors<'a> {
    tree: &'a LabelTree,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(|node| node.parent);
        Some(current)
    }
}
