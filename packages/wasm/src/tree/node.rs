//! Node type and related structures.
//!
//! Nodes are the groups and categories of the axis hierarchy. Each node has:
//! - A stable index into the flat table (survives expand/collapse/zoom)
//! - Parent back-pointer, level and position among its siblings
//! - A tri-state expand flag
//! - Transient layout fields written by the tick layout

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BuildError;

/// Slot of a node in the pre-order arena of a [`LabelTree`].
///
/// Assigned once per build in pre-order, so a parent always has a smaller
/// index than its descendants. Indices from one build are meaningless in the
/// next; use [`LabelTree::path`] to carry a node across rebuilds.
///
/// [`LabelTree`]: super::LabelTree
/// [`LabelTree::path`]: super::LabelTree::path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// The id handed to the host.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Position in the arena's node vector.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Expand state of a node.
///
/// On the wire this is `false`, `true` or `"focus"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ExpandFlag", into = "ExpandFlag")]
pub enum ExpandState {
    /// The node stands in for its whole subtree.
    Collapsed,
    /// The node's children take part in the visible cut.
    #[default]
    Expanded,
    /// Expanded, and the visible range is restricted to this subtree.
    Focus,
}

impl ExpandState {
    /// True for both `Expanded` and `Focus`.
    #[inline]
    pub fn is_expanded(self) -> bool {
        !matches!(self, Self::Collapsed)
    }

    #[inline]
    pub fn is_focus(self) -> bool {
        matches!(self, Self::Focus)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Collapsed => "false",
            Self::Expanded => "true",
            Self::Focus => "\"focus\"",
        }
    }
}

/// Raw `expand` value as it appears in host input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpandFlag {
    Flag(bool),
    Mode(String),
}

impl TryFrom<ExpandFlag> for ExpandState {
    type Error = BuildError;

    fn try_from(flag: ExpandFlag) -> Result<Self, Self::Error> {
        match flag {
            ExpandFlag::Flag(true) => Ok(Self::Expanded),
            ExpandFlag::Flag(false) => Ok(Self::Collapsed),
            ExpandFlag::Mode(mode) if mode == "focus" => Ok(Self::Focus),
            ExpandFlag::Mode(mode) => Err(BuildError::UnknownExpand(mode)),
        }
    }
}

impl From<ExpandState> for ExpandFlag {
    fn from(state: ExpandState) -> Self {
        match state {
            ExpandState::Collapsed => Self::Flag(false),
            ExpandState::Expanded => Self::Flag(true),
            ExpandState::Focus => Self::Mode("focus".to_owned()),
        }
    }
}

/// A node of the flat table.
#[derive(Debug, Clone)]
pub struct Node {
    pub label: String,
    /// `None` for roots.
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub level: usize,
    /// Position among siblings.
    pub rel_index: usize,
    pub expand: ExpandState,
    /// True while the node is not part of the visible sequence.
    pub hidden: bool,
    /// Tick center in pixels, written by the tick layout.
    pub center: f32,
    /// Tick half-width in pixels, written by the tick layout.
    pub width: f32,
    /// Extra descriptor keys, consulted by attribute inheritance.
    pub attributes: Map<String, Value>,
}

impl Node {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this node can be collapsed or expanded at all.
    #[inline]
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_index_slot_and_display() {
        let index = NodeIndex(42);
        assert_eq!(index.raw(), 42);
        assert_eq!(index.slot(), 42);
        assert_eq!(index.to_string(), "Node(42)");
        assert_eq!(serde_json::to_string(&index).expect("json"), "42", "ids cross the boundary as plain numbers");
    }

    #[test]
    fn test_expand_state_wire_format() {
        let states = [ExpandState::Collapsed, ExpandState::Expanded, ExpandState::Focus];
        let json = serde_json::to_string(&states).expect("serialize");
        assert_eq!(json, r#"[false,true,"focus"]"#);

        let parsed: Vec<ExpandState> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, states);
    }

    #[test]
    fn test_expand_state_rejects_unknown_mode() {
        let parsed: Result<ExpandState, _> = serde_json::from_str(r#""open""#);
        assert!(parsed.is_err(), "only \"focus\" is a valid mode string");
    }

    #[test]
    fn test_focus_implies_expanded() {
        assert!(ExpandState::Focus.is_expanded());
        assert!(ExpandState::Expanded.is_expanded());
        assert!(!ExpandState::Collapsed.is_expanded());
        assert!(ExpandState::Focus.is_focus());
        assert!(!ExpandState::Expanded.is_focus());
    }
}
