//! Span logic - where a group sits in the visible sequence.
//!
//! A group's visible descendants always form one contiguous run of the
//! visible sequence (the sequence is a pre-order cut). The run tells the
//! renderer where to draw the group's bracket and label, and tells the hit
//! test which visible node carries the group's collapse and zoom controls.

use std::ops::Range;

use serde::Serialize;

use super::ticks::TickGeometry;
use crate::config::GroupLabelPosition;
use crate::tree::{LabelTree, NodeIndex};

/// Visible extent of a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpan {
    pub group: NodeIndex,
    /// Visible index of the leftmost visible descendant.
    pub first: usize,
    /// Visible index of the rightmost visible descendant.
    pub last: usize,
    /// The leftmost visible descendant is the group's true first descendant.
    pub has_first_child: bool,
    /// The rightmost visible descendant is the group's true last descendant.
    pub has_last_child: bool,
    /// Label anchor in pixels; `None` when no current layout is available.
    pub label_center: Option<f32>,
}

/// Range of visible indices occupied by descendants of `group`.
pub fn descendant_span(tree: &LabelTree, visible: &[NodeIndex], group: NodeIndex) -> Option<Range<usize>> {
    let start = visible.iter().position(|&i| tree.is_descendant_of(i, group))?;
    let len = visible[start..]
        .iter()
        .take_while(|&&i| tree.is_descendant_of(i, group))
        .count();
    Some(start..start + len)
}

/// Compute the span of `group`, or `None` if none of its descendants is
/// visible.
pub fn span_logic(
    tree: &LabelTree,
    visible: &[NodeIndex],
    ticks: &[TickGeometry],
    group: NodeIndex,
    position: GroupLabelPosition,
) -> Option<GroupSpan> {
    let range = descendant_span(tree, visible, group)?;
    let first = range.start;
    let last = range.end - 1;

    let label_center = (ticks.len() == visible.len()).then(|| match position {
        GroupLabelPosition::Center => (ticks[first].center + ticks[last].center) / 2.0,
        GroupLabelPosition::First => ticks[first].center,
        GroupLabelPosition::Last => ticks[last].center,
    });

    Some(GroupSpan {
        group,
        first,
        last,
        has_first_child: is_edge_descendant(tree, visible[first], group, |_| 0),
        has_last_child: is_edge_descendant(tree, visible[last], group, |siblings| siblings - 1),
        label_center,
    })
}

/// True if every step from `index` up to `group` sits at the edge selected by
/// `edge` (given the sibling count).
fn is_edge_descendant(
    tree: &LabelTree,
    index: NodeIndex,
    group: NodeIndex,
    edge: impl Fn(usize) -> usize,
) -> bool {
    let mut current = index;
    while current != group {
        let node = tree.node(current);
        let Some(parent) = node.parent else {
            return false;
        };
        if node.rel_index != edge(tree.node(parent).children.len()) {
            return false;
        }
        current = parent;
    }
    true
}
