//! Shadow trees - per-dataset value stores shaped like the label tree.
//!
//! A dataset supplies its values nested the same way as the labels:
//!
//! ```json
//! [{ "value": 7, "children": [3, 4] }, { "value": 2, "children": [2] }]
//! ```
//!
//! Every label node owns one slot, addressed by its root-to-node path of
//! sibling positions. A group's own `value` is what the axis shows while the
//! group is collapsed. The shadow tree is validated against the labels once
//! and never modified afterwards; expand, collapse and zoom only change which
//! slots are projected.

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::tree::{LabelTree, NodeIndex};

/// One slot of a dataset's nested input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueNode {
    Group {
        #[serde(default)]
        value: Option<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ValueNode>,
    },
    Scalar(Option<f64>),
}

impl ValueNode {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Group { value, .. } => *value,
            Self::Scalar(value) => *value,
        }
    }

    pub fn children(&self) -> &[ValueNode] {
        match self {
            Self::Group { children, .. } => children,
            Self::Scalar(_) => &[],
        }
    }
}

/// Validated, immutable value tree of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowTree {
    roots: Vec<ValueNode>,
}

impl ShadowTree {
    /// Validate `roots` against the label tree shape.
    pub fn new(dataset: &str, roots: Vec<ValueNode>, tree: &LabelTree) -> Result<Self, DataError> {
        let mut path = Vec::new();
        check_level(dataset, &roots, tree.roots(), tree, &mut path)?;
        Ok(Self { roots })
    }

    /// Value stored at a root-to-node path of sibling positions.
    pub fn value_at(&self, path: &[usize]) -> Option<f64> {
        let (&first, rest) = path.split_first()?;
        let mut slot = self.roots.get(first)?;
        for &rel in rest {
            slot = slot.children().get(rel)?;
        }
        slot.value()
    }
}

fn check_level(
    dataset: &str,
    values: &[ValueNode],
    labels: &[NodeIndex],
    tree: &LabelTree,
    path: &mut Vec<usize>,
) -> Result<(), DataError> {
    if values.len() != labels.len() {
        if values.is_empty() {
            path.push(0);
            return Err(DataError::MissingSlot {
                dataset: dataset.to_owned(),
                path: path.clone(),
            });
        }
        return Err(DataError::ChildCountMismatch {
            dataset: dataset.to_owned(),
            path: path.clone(),
            expected: labels.len(),
            actual: values.len(),
        });
    }

    for (rel, (value, &label)) in values.iter().zip(labels).enumerate() {
        path.push(rel);
        let node = tree.node(label);
        if node.is_leaf() && !value.children().is_empty() {
            return Err(DataError::ChildrenUnderLeaf {
                dataset: dataset.to_owned(),
                path: path.clone(),
            });
        }
        if node.is_group() {
            check_level(dataset, value.children(), &node.children, tree, path)?;
        }
        path.pop();
    }
    Ok(())
}
