//! Attribute inheritance.
//!
//! Style attributes (colors, border widths, ...) may be set on any label
//! descriptor. A visible node takes the value from the closest node on its
//! ancestor chain that owns the attribute, falling back to the configured
//! default. Resolved attributes are always kept as arrays aligned with the
//! visible sequence; only [`AttributeValue::collapse`] at the host boundary
//! turns a uniform array into a single scalar.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::node::NodeIndex;
use super::table::LabelTree;

/// Attribute name to per-visible-node values.
pub type AttributeTable = BTreeMap<String, Vec<Value>>;

/// Resolve one attribute for one node by walking up its ancestors.
pub fn inherited<'a>(tree: &'a LabelTree, index: NodeIndex, name: &str) -> Option<&'a Value> {
    std::iter::once(index)
        .chain(tree.ancestors(index))
        .find_map(|i| tree.node(i).attributes.get(name))
}

/// Resolve every configured attribute for the visible sequence.
///
/// `overrides` replace entries of `defaults` of the same name; attributes that
/// only appear in `overrides` are resolved too.
pub fn update_attributes(
    tree: &LabelTree,
    visible: &[NodeIndex],
    defaults: &Map<String, Value>,
    overrides: &Map<String, Value>,
) -> AttributeTable {
    let mut merged: BTreeMap<&str, &Value> = defaults.iter().map(|(k, v)| (k.as_str(), v)).collect();
    merged.extend(overrides.iter().map(|(k, v)| (k.as_str(), v)));

    merged
        .into_iter()
        .map(|(name, default)| {
            let values = visible
                .iter()
                .map(|&index| inherited(tree, index, name).unwrap_or(default).clone())
                .collect();
            (name.to_owned(), values)
        })
        .collect()
}

/// Host-facing shape of one resolved attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(Value),
    Array(Vec<Value>),
}

impl AttributeValue {
    /// Collapse an array whose elements are all equal into that element.
    pub fn collapse(values: &[Value]) -> Self {
        match values.split_first() {
            Some((first, rest)) if rest.iter().all(|v| v == first) => Self::Scalar(first.clone()),
            _ => Self::Array(values.to_vec()),
        }
    }
}

/// Collapse a whole table for serialization.
pub fn collapse_table(table: &AttributeTable) -> BTreeMap<&str, AttributeValue> {
    table
        .iter()
        .map(|(name, values)| (name.as_str(), AttributeValue::collapse(values)))
        .collect()
}
