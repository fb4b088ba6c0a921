//! Serializable snapshot of expand state.
//!
//! Node indices do not survive a rebuild, so flags are recorded by the
//! root-to-node path of sibling positions. The host may persist a snapshot
//! and restore it after the labels are rebuilt.

use serde::{Deserialize, Serialize};

use super::node::{ExpandState, NodeIndex};
use super::table::LabelTree;
use crate::error::{AxisError, BuildError};

/// Expand flag of one group, addressed by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandEntry {
    pub path: Vec<usize>,
    pub expand: ExpandState,
}

/// Expand flags of every group in a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandSnapshot {
    pub entries: Vec<ExpandEntry>,
}

impl ExpandSnapshot {
    /// Record the flag of every non-leaf node.
    pub fn capture(tree: &LabelTree) -> Self {
        let entries = tree
            .indices()
            .filter(|&i| tree.node(i).is_group())
            .map(|i| ExpandEntry {
                path: tree.path(i),
                expand: tree.node(i).expand,
            })
            .collect();
        Self { entries }
    }

    /// Write the recorded flags into `tree`.
    ///
    /// The resulting flags are validated (known paths, a single focus, no
    /// focus below a collapsed group) before anything is written, so a
    /// rejected snapshot leaves the tree unchanged. Groups missing from the
    /// snapshot keep their current flag, except that a focus in the snapshot
    /// replaces any current focus.
    pub fn apply(&self, tree: &mut LabelTree) -> Result<(), AxisError> {
        let mut flags: Vec<ExpandState> = tree.nodes().iter().map(|n| n.expand).collect();
        if self.entries.iter().any(|e| e.expand.is_focus()) {
            for flag in flags.iter_mut().filter(|f| f.is_focus()) {
                *flag = ExpandState::Expanded;
            }
        }
        for entry in &self.entries {
            let index = tree
                .find_by_path(&entry.path)
                .filter(|&i| tree.node(i).is_group())
                .ok_or_else(|| AxisError::InvalidSnapshot {
                    path: entry.path.clone(),
                })?;
            flags[index.slot()] = entry.expand;
        }

        let focused: Vec<NodeIndex> = tree.indices().filter(|&i| flags[i.slot()].is_focus()).collect();
        if let Some((&focus, rest)) = focused.split_first() {
            if let Some(&second) = rest.first() {
                return Err(BuildError::MultipleFocus {
                    first: tree.node(focus).label.clone(),
                    second: tree.node(second).label.clone(),
                }
                .into());
            }
            if let Some(ancestor) = tree
                .ancestors(focus)
                .find(|a| !flags[a.slot()].is_expanded())
            {
                return Err(BuildError::FocusUnderCollapsed {
                    label: tree.node(focus).label.clone(),
                    ancestor: tree.node(ancestor).label.clone(),
                }
                .into());
            }
        }

        for (slot, expand) in flags.into_iter().enumerate() {
            tree.set_expand(NodeIndex(slot as u32), expand);
        }
        Ok(())
    }
}
