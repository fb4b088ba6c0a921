//! Tree builder.
//!
//! Converts the nested label structure supplied by the host into the flat
//! pre-order node table. Input nodes are either bare strings (leaves) or
//! descriptors:
//!
//! ```json
//! { "label": "2020", "expand": false, "children": ["Q1", "Q2"], "backgroundColor": "red" }
//! ```
//!
//! Every descriptor key other than `label`, `children` and `expand` is kept as
//! a node attribute for attribute inheritance.
//!
//! The host calls the builder on every chart update. [`TreeBuilder`] remembers
//! a fingerprint of the last input it built so unchanged input is a no-op that
//! keeps the live expand/zoom state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::{ExpandFlag, ExpandState, Node, NodeIndex};
use super::table::LabelTree;
use crate::error::BuildError;

/// One node of the nested label input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelInput {
    Leaf(String),
    Group(LabelDescriptor),
}

impl From<&str> for LabelInput {
    fn from(label: &str) -> Self {
        Self::Leaf(label.to_owned())
    }
}

/// Descriptor form of a label node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDescriptor {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LabelInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<ExpandFlag>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Structural fingerprint of a label input.
///
/// `None` when the input could not be serialized; such input is always
/// rebuilt.
pub fn fingerprint(labels: &[LabelInput]) -> Option<String> {
    match serde_json::to_string(labels) {
        Ok(serialized) => Some(serialized),
        Err(err) => {
            log::warn!("label fingerprint unavailable: {err}");
            None
        }
    }
}

/// Fingerprint-gated tree builder.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    fingerprint: Option<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a new tree unless `labels` matches the last successful build.
    ///
    /// Returns `Ok(None)` for unchanged input.
    pub fn build_if_changed(&mut self, labels: &[LabelInput]) -> Result<Option<LabelTree>, BuildError> {
        let next = fingerprint(labels);
        if next.is_some() && next == self.fingerprint {
            log::debug!("label input unchanged, keeping current tree");
            return Ok(None);
        }

        let tree = build_tree(labels)?;
        log::debug!("built label tree with {} nodes", tree.len());
        self.fingerprint = next;
        Ok(Some(tree))
    }

    /// Forget the last fingerprint so the next call always rebuilds.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }
}

/// Build the flat node table from nested input.
pub fn build_tree(labels: &[LabelInput]) -> Result<LabelTree, BuildError> {
    let mut state = BuildState::default();
    let mut roots = Vec::with_capacity(labels.len());
    for (rel_index, input) in labels.iter().enumerate() {
        roots.push(state.push(input, None, rel_index)?);
    }
    Ok(LabelTree::from_parts(state.nodes, roots))
}

#[derive(Default)]
struct BuildState {
    nodes: Vec<Node>,
    path: Vec<usize>,
    focus: Option<NodeIndex>,
    /// Closest collapsed ancestor of the node being pushed.
    collapsed: Vec<NodeIndex>,
}

impl BuildState {
    fn push(
        &mut self,
        input: &LabelInput,
        parent: Option<NodeIndex>,
        rel_index: usize,
    ) -> Result<NodeIndex, BuildError> {
        self.path.push(rel_index);

        let (label, children, expand, attributes) = match input {
            LabelInput::Leaf(label) => (label, &[][..], ExpandState::Expanded, Map::new()),
            LabelInput::Group(desc) => {
                let expand = match &desc.expand {
                    Some(flag) => ExpandState::try_from(flag.clone())?,
                    None => ExpandState::Expanded,
                };
                (&desc.label, &desc.children[..], expand, desc.attributes.clone())
            }
        };

        if label.is_empty() {
            return Err(BuildError::EmptyLabel {
                path: self.path.clone(),
            });
        }
        if children.is_empty() && expand != ExpandState::Expanded {
            return Err(BuildError::LeafNotExpandable {
                label: label.clone(),
                expand: expand.as_str(),
            });
        }

        let index = NodeIndex(self.nodes.len() as u32);
        if expand.is_focus() {
            if let Some(first) = self.focus {
                return Err(BuildError::MultipleFocus {
                    first: self.nodes[first.slot()].label.clone(),
                    second: label.clone(),
                });
            }
            if let Some(&ancestor) = self.collapsed.last() {
                return Err(BuildError::FocusUnderCollapsed {
                    label: label.clone(),
                    ancestor: self.nodes[ancestor.slot()].label.clone(),
                });
            }
            self.focus = Some(index);
        }

        let level = parent.map_or(0, |p| self.nodes[p.slot()].level + 1);
        self.nodes.push(Node {
            label: label.clone(),
            parent,
            children: Vec::with_capacity(children.len()),
            level,
            rel_index,
            expand,
            hidden: false,
            center: 0.0,
            width: 0.0,
            attributes,
        });

        let collapsed = expand == ExpandState::Collapsed;
        if collapsed {
            self.collapsed.push(index);
        }
        let mut child_indices = Vec::with_capacity(children.len());
        for (child_rel, child) in children.iter().enumerate() {
            child_indices.push(self.push(child, Some(index), child_rel)?);
        }
        if collapsed {
            self.collapsed.pop();
        }

        self.nodes[index.slot()].children = child_indices;
        self.path.pop();
        Ok(index)
    }
}
