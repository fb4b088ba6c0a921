//! Visibility diffs.
//!
//! Every state transition changes the visible sequence by replacing one
//! contiguous run with a new run of nodes. [`VisibilityDiff::apply`] performs
//! that replacement on the visible sequence and on every dataset's value
//! array in one step, so the two never disagree in length or order.

use crate::dataset::Dataset;
use crate::tree::{LabelTree, NodeIndex};

/// Replace `remove` visible nodes starting at `start` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityDiff {
    pub start: usize,
    pub remove: usize,
    pub insert: Vec<NodeIndex>,
}

impl VisibilityDiff {
    pub fn new(start: usize, remove: usize, insert: Vec<NodeIndex>) -> Self {
        Self {
            start,
            remove,
            insert,
        }
    }

    /// Pure insertion at `start`.
    pub fn insert_at(start: usize, insert: Vec<NodeIndex>) -> Self {
        Self::new(start, 0, insert)
    }

    /// Pure removal of `remove` nodes at `start`.
    pub fn remove_at(start: usize, remove: usize) -> Self {
        Self::new(start, remove, Vec::new())
    }

    pub fn is_noop(&self) -> bool {
        self.remove == 0 && self.insert.is_empty()
    }

    /// Apply to the visible sequence and every dataset.
    ///
    /// Removed nodes are marked hidden, inserted nodes visible. Callers
    /// guarantee `start + remove <= visible.len()`.
    pub fn apply(self, tree: &mut LabelTree, visible: &mut Vec<NodeIndex>, datasets: &mut [Dataset]) {
        if self.is_noop() {
            return;
        }
        let range = self.start..self.start + self.remove;
        debug_assert!(range.end <= visible.len(), "diff {range:?} outside {}", visible.len());

        let removed: Vec<NodeIndex> = visible
            .splice(range.clone(), self.insert.iter().copied())
            .collect();
        for index in removed {
            tree.node_mut(index).hidden = true;
        }
        for &index in &self.insert {
            tree.node_mut(index).hidden = false;
        }

        for dataset in datasets.iter_mut() {
            dataset.splice(tree, range.clone(), &self.insert);
            debug_assert_eq!(dataset.values().len(), visible.len(), "dataset '{}' misaligned", dataset.label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetInput;
    use crate::tree::builder::{LabelInput, build_tree};
    use crate::tree::visibility::determine_visible;

    #[test]
    fn test_apply_keeps_datasets_aligned() {
        let labels: Vec<LabelInput> =
            serde_json::from_str(r#"[{"label": "A", "children": ["a1", "a2"]}, "B"]"#).expect("labels");
        let mut tree = build_tree(&labels).expect("tree");
        let mut visible = determine_visible(&tree);

        let input = DatasetInput {
            label: "d".into(),
            data: serde_json::from_str(r#"[{"value": 10, "children": [1, 2]}, 3]"#).expect("data"),
            attributes: None,
        };
        let mut datasets = vec![Dataset::new(input, &tree).expect("dataset")];
        datasets[0].project(&tree, &visible);

        let a = tree.roots()[0];
        VisibilityDiff::new(0, 2, vec![a]).apply(&mut tree, &mut visible, &mut datasets);

        assert_eq!(visible, vec![a, tree.roots()[1]]);
        assert_eq!(datasets[0].values(), &[Some(10.0), Some(3.0)]);
        assert!(tree.node(NodeIndex(1)).hidden && tree.node(NodeIndex(2)).hidden);
        assert!(!tree.node(a).hidden);
    }

    #[test]
    fn test_noop_diff() {
        assert!(VisibilityDiff::insert_at(3, vec![]).is_noop());
        assert!(VisibilityDiff::remove_at(0, 0).is_noop());
        assert!(!VisibilityDiff::remove_at(0, 1).is_noop());
    }
}
