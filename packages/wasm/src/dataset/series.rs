//! Dataset - one chart series projected onto the visible sequence.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::shadow::{ShadowTree, ValueNode};
use crate::error::DataError;
use crate::tree::attributes::{AttributeTable, update_attributes};
use crate::tree::visibility::resolve;
use crate::tree::{LabelTree, NodeIndex};

/// Dataset as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInput {
    #[serde(default)]
    pub label: String,
    pub data: Vec<ValueNode>,
    /// Per-dataset attribute defaults, overriding the axis defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

/// A validated dataset with its live, visible-aligned arrays.
#[derive(Debug, Clone)]
pub struct Dataset {
    label: String,
    shadow: ShadowTree,
    overrides: Map<String, Value>,
    values: Vec<Option<f64>>,
    attributes: AttributeTable,
}

impl Dataset {
    /// Validate `input` against the label tree. The live arrays start empty
    /// until [`Dataset::project`] is called.
    pub fn new(input: DatasetInput, tree: &LabelTree) -> Result<Self, DataError> {
        let overrides = match input.attributes {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(DataError::AttributesNotObject {
                    dataset: input.label,
                });
            }
        };
        let shadow = ShadowTree::new(&input.label, input.data, tree)?;
        Ok(Self {
            label: input.label,
            shadow,
            overrides,
            values: Vec::new(),
            attributes: AttributeTable::new(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Values aligned with the visible sequence.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Resolved attributes aligned with the visible sequence.
    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    /// Recompute the value array for a whole visible sequence.
    pub fn project(&mut self, tree: &LabelTree, visible: &[NodeIndex]) {
        self.values = visible.iter().map(|&i| resolve(tree, i, &self.shadow)).collect();
    }

    /// Replace `range` of the value array with the values of `insert`.
    pub(crate) fn splice(&mut self, tree: &LabelTree, range: Range<usize>, insert: &[NodeIndex]) {
        let shadow = &self.shadow;
        self.values
            .splice(range, insert.iter().map(|&i| resolve(tree, i, shadow)));
    }

    pub(crate) fn refresh_attributes(
        &mut self,
        tree: &LabelTree,
        visible: &[NodeIndex],
        defaults: &Map<String, Value>,
    ) {
        self.attributes = update_attributes(tree, visible, defaults, &self.overrides);
    }
}
