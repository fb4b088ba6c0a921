//! Expand / collapse / zoom state machine.
//!
//! Each transition checks its precondition, updates expand flags, and then
//! changes the visible sequence through [`VisibilityDiff`]s so every dataset
//! stays aligned. A rejected transition changes nothing.

use super::diff::VisibilityDiff;
use super::engine::AxisEngine;
use crate::error::{AxisError, Operation, Result};
use crate::layout::span::descendant_span;
use crate::spatial::{Interaction, InteractionKind};
use crate::tree::visibility::{determine_visible, determine_visible_under};
use crate::tree::{ExpandState, NodeIndex};

impl AxisEngine {
    fn apply_diff(&mut self, diff: VisibilityDiff) {
        diff.apply(&mut self.tree, &mut self.visible, &mut self.datasets);
    }

    fn expand_state(&self, operation: Operation, node: NodeIndex) -> Result<ExpandState> {
        match self.tree.get(node) {
            Some(n) => Ok(n.expand),
            None => {
                log::warn!("{operation} on unknown {node}");
                Err(AxisError::UnknownNode(node))
            }
        }
    }

    /// Show the children of a collapsed group in its place.
    pub fn expand(&mut self, node: NodeIndex) -> Result<()> {
        let op = Operation::Expand;
        if self.expand_state(op, node)? != ExpandState::Collapsed {
            return Err(AxisError::precondition(op, node, "node is not collapsed"));
        }
        if self.tree.node(node).is_leaf() {
            return Err(AxisError::precondition(op, node, "node has no children"));
        }
        let Some(at) = self.visible.iter().position(|&i| i == node) else {
            return Err(AxisError::precondition(op, node, "node is not visible"));
        };

        self.tree.set_expand(node, ExpandState::Expanded);
        let insert = determine_visible_under(&self.tree, node);
        log::debug!("expand {node}: 1 -> {} visible at {at}", insert.len());
        self.apply_diff(VisibilityDiff::new(at, 1, insert));
        self.refresh();
        Ok(())
    }

    /// Replace the visible descendants of an expanded group with the group.
    ///
    /// Every descendant is collapsed too, so expanding again shows only the
    /// direct children.
    pub fn collapse(&mut self, parent: NodeIndex) -> Result<()> {
        let op = Operation::Collapse;
        match self.expand_state(op, parent)? {
            ExpandState::Expanded => {}
            ExpandState::Focus => return Err(AxisError::precondition(op, parent, "node is focused")),
            ExpandState::Collapsed => {
                return Err(AxisError::precondition(op, parent, "node is already collapsed"));
            }
        }
        if self.tree.has_focused_descendant(parent) {
            return Err(AxisError::precondition(op, parent, "a descendant is focused"));
        }
        let Some(span) = descendant_span(&self.tree, &self.visible, parent) else {
            return Err(AxisError::precondition(op, parent, "no descendant is visible"));
        };

        for d in self.tree.descendants(parent) {
            self.tree.set_expand(d, ExpandState::Collapsed);
        }
        self.tree.set_expand(parent, ExpandState::Collapsed);
        log::debug!("collapse {parent}: {} -> 1 visible at {}", span.len(), span.start);
        self.apply_diff(VisibilityDiff::new(span.start, span.len(), vec![parent]));
        self.refresh();
        Ok(())
    }

    /// Restrict the visible sequence to the visible descendants of `parent`.
    ///
    /// `anchor` is the visible index of any of those descendants, usually the
    /// clicked one.
    pub fn zoom_in(&mut self, parent: NodeIndex, anchor: usize) -> Result<()> {
        let op = Operation::ZoomIn;
        match self.expand_state(op, parent)? {
            ExpandState::Expanded => {}
            ExpandState::Focus => return Err(AxisError::precondition(op, parent, "node is already focused")),
            ExpandState::Collapsed => return Err(AxisError::precondition(op, parent, "node is collapsed")),
        }
        if self.tree.has_focus_outside_lineage(parent) {
            return Err(AxisError::precondition(op, parent, "another subtree is focused"));
        }
        let in_group = |i: NodeIndex| self.tree.is_descendant_of(i, parent);
        if !self.visible.get(anchor).is_some_and(|&i| in_group(i)) {
            return Err(AxisError::precondition(op, parent, "anchor is not a visible descendant"));
        }

        let start = anchor - self.visible[..anchor].iter().rev().take_while(|&&i| in_group(i)).count();
        let count = self.visible[start..].iter().take_while(|&&i| in_group(i)).count();
        let end = start + count;
        let trailing = self.visible.len() - end;

        if let Some(previous) = self.tree.focused() {
            self.tree.set_expand(previous, ExpandState::Expanded);
        }
        self.tree.set_expand(parent, ExpandState::Focus);
        log::debug!("zoom in {parent}: keep {start}..{end} of {}", self.visible.len());
        self.apply_diff(VisibilityDiff::remove_at(end, trailing));
        self.apply_diff(VisibilityDiff::remove_at(0, start));
        self.refresh();
        Ok(())
    }

    /// Leave focus and splice the rest of the cut back around the current
    /// span.
    pub fn zoom_out(&mut self, parent: NodeIndex) -> Result<()> {
        let op = Operation::ZoomOut;
        if self.expand_state(op, parent)? != ExpandState::Focus {
            return Err(AxisError::precondition(op, parent, "node is not focused"));
        }

        // Focus and expanded produce the same cut, so the full sequence can be
        // computed before the flag changes.
        let full = determine_visible(&self.tree);
        let len = self.visible.len();
        let pos = self
            .visible
            .first()
            .and_then(|first| full.iter().position(|i| i == first))
            .filter(|&pos| full.get(pos..pos + len) == Some(&self.visible[..]));
        let Some(pos) = pos else {
            return Err(AxisError::precondition(op, parent, "visible sequence is not part of the full cut"));
        };

        self.tree.set_expand(parent, ExpandState::Expanded);
        log::debug!("zoom out {parent}: restore {} before, {} after", pos, full.len() - pos - len);
        self.apply_diff(VisibilityDiff::insert_at(len, full[pos + len..].to_vec()));
        self.apply_diff(VisibilityDiff::insert_at(0, full[..pos].to_vec()));
        self.refresh();
        Ok(())
    }

    /// Run the transition a hit test resolved.
    pub fn apply(&mut self, interaction: Interaction) -> Result<()> {
        match interaction.kind {
            InteractionKind::Expand => self.expand(interaction.node),
            InteractionKind::Collapse => self.collapse(interaction.node),
            InteractionKind::ZoomIn => self.zoom_in(interaction.node, interaction.anchor),
            InteractionKind::ZoomOut => self.zoom_out(interaction.node),
        }
    }
}
