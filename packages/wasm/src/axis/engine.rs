//! AxisEngine - the owning aggregate of the hierarchy axis.
//!
//! The engine owns the label tree, the visible sequence, the datasets and
//! the last computed tick geometry, and sequences the pipeline:
//!
//! - `update`: fingerprint-gated rebuild, visible cut, dataset projection
//! - `layout`: tick geometry for the current visible sequence
//! - `hit_test`: pointer to interaction
//! - `expand` / `collapse` / `zoom_in` / `zoom_out`: state transitions
//!
//! Every operation takes the engine as a whole, so a host sharing it across
//! threads needs one lock around the engine, held for a full operation.

use std::collections::BTreeMap;

use crate::config::AxisOptions;
use crate::dataset::{Dataset, DatasetInput};
use crate::error::{AxisError, Result};
use crate::layout::span::{GroupSpan, span_logic};
use crate::layout::ticks::{TickGeometry, TickLayout, pixel_to_index};
use crate::spatial::{HierarchyBand, Interaction, resolve_interaction};
use crate::tree::attributes::{AttributeValue, collapse_table};
use crate::tree::snapshot::ExpandSnapshot;
use crate::tree::visibility::initial_visible;
use crate::tree::{LabelInput, LabelTree, NodeIndex, TreeBuilder};

/// Axis placement of the last layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisSpan {
    start: f32,
    length: f32,
}

/// The hierarchy axis engine.
pub struct AxisEngine {
    pub(super) options: AxisOptions,
    builder: TreeBuilder,
    pub(super) tree: LabelTree,
    pub(super) visible: Vec<NodeIndex>,
    pub(super) datasets: Vec<Dataset>,
    ticks: Vec<TickGeometry>,
    axis: Option<AxisSpan>,
}

impl AxisEngine {
    /// Create an empty engine.
    pub fn new(options: AxisOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            builder: TreeBuilder::new(),
            tree: LabelTree::default(),
            visible: Vec::new(),
            datasets: Vec::new(),
            ticks: Vec::new(),
            axis: None,
        })
    }

    pub fn options(&self) -> &AxisOptions {
        &self.options
    }

    pub fn tree(&self) -> &LabelTree {
        &self.tree
    }

    /// The visible sequence.
    pub fn visible(&self) -> &[NodeIndex] {
        &self.visible
    }

    pub fn visible_labels(&self) -> Vec<String> {
        self.visible
            .iter()
            .map(|&i| self.tree.node(i).label.clone())
            .collect()
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn dataset(&self, index: usize) -> Result<&Dataset> {
        self.datasets.get(index).ok_or(AxisError::UnknownDataset(index))
    }

    /// Attributes of one dataset, uniform arrays collapsed to scalars.
    pub fn dataset_attributes(&self, index: usize) -> Result<BTreeMap<&str, AttributeValue>> {
        Ok(collapse_table(self.dataset(index)?.attributes()))
    }

    /// Tick geometry of the last layout pass.
    pub fn ticks(&self) -> &[TickGeometry] {
        &self.ticks
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Apply new chart data.
    ///
    /// The label tree is only rebuilt when the labels changed; otherwise the
    /// current expand/zoom state is kept and only the datasets are replaced.
    /// Returns whether the tree was rebuilt. On error nothing changes.
    pub fn update(&mut self, labels: &[LabelInput], datasets: Vec<DatasetInput>) -> Result<bool> {
        let rebuilt = self.builder.build_if_changed(labels)?;
        let tree = rebuilt.as_ref().unwrap_or(&self.tree);

        let mut next = Vec::with_capacity(datasets.len());
        for input in datasets {
            match Dataset::new(input, tree) {
                Ok(dataset) => next.push(dataset),
                Err(err) => {
                    // The labels were accepted but not committed.
                    if rebuilt.is_some() {
                        self.builder.invalidate();
                    }
                    return Err(err.into());
                }
            }
        }

        let changed = rebuilt.is_some();
        if let Some(tree) = rebuilt {
            self.visible = initial_visible(&tree);
            self.tree = tree;
            self.sync_hidden();
        }
        self.datasets = next;
        for dataset in &mut self.datasets {
            dataset.project(&self.tree, &self.visible);
        }
        self.refresh();

        log::debug!(
            "update: rebuilt={changed}, {} visible, {} datasets",
            self.visible.len(),
            self.datasets.len()
        );
        Ok(changed)
    }

    /// Set `hidden` from the visible sequence for every node.
    fn sync_hidden(&mut self) {
        for index in self.tree.indices().collect::<Vec<_>>() {
            self.tree.node_mut(index).hidden = true;
        }
        for &index in &self.visible {
            self.tree.node_mut(index).hidden = false;
        }
    }

    /// Recompute derived per-visible-node state after the visible sequence
    /// changed: attributes, and geometry if a layout pass has happened.
    pub(super) fn refresh(&mut self) {
        for dataset in &mut self.datasets {
            dataset.refresh_attributes(&self.tree, &self.visible, &self.options.attributes);
        }
        match self.axis {
            Some(axis) => self.run_layout(axis),
            None => self.ticks.clear(),
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the visible sequence along `[start, start + length]`.
    pub fn layout(&mut self, start: f32, length: f32) -> &[TickGeometry] {
        let axis = AxisSpan { start, length };
        self.axis = Some(axis);
        self.run_layout(axis);
        &self.ticks
    }

    fn run_layout(&mut self, axis: AxisSpan) {
        let layout = TickLayout::new(axis.start, axis.length, self.options.level_percentage);
        self.ticks = layout.apply(&mut self.tree, &self.visible);
    }

    /// Visible index whose tick contains `pixel`.
    pub fn pixel_to_index(&self, pixel: f32) -> Option<usize> {
        pixel_to_index(&self.ticks, pixel)
    }

    /// Span of a group in the current visible sequence.
    pub fn group_span(&self, group: NodeIndex) -> Option<GroupSpan> {
        if !self.tree.contains(group) {
            return None;
        }
        span_logic(
            &self.tree,
            &self.visible,
            &self.ticks,
            group,
            self.options.group_label_position,
        )
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Resolve a pointer position to an interaction.
    ///
    /// `band_start` is the perpendicular coordinate of the axis line. Static
    /// axes never produce interactions.
    pub fn hit_test(&self, x: f32, y: f32, band_start: f32) -> Option<Interaction> {
        if self.options.static_axis {
            return None;
        }
        let band = HierarchyBand::new(band_start, &self.options);
        resolve_interaction(&self.tree, &self.visible, &self.ticks, &band, x, y)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub fn snapshot(&self) -> ExpandSnapshot {
        ExpandSnapshot::capture(&self.tree)
    }

    /// Restore expand flags and recompute everything that depends on them.
    pub fn restore(&mut self, snapshot: &ExpandSnapshot) -> Result<()> {
        snapshot.apply(&mut self.tree)?;
        self.visible = initial_visible(&self.tree);
        self.sync_hidden();
        for dataset in &mut self.datasets {
            dataset.project(&self.tree, &self.visible);
        }
        self.refresh();
        log::debug!("restored {} expand entries", snapshot.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::visibility::is_valid_cut;
    use serde_json::json;

    fn labels(json: &str) -> Vec<LabelInput> {
        serde_json::from_str(json).expect("labels")
    }

    fn dataset(json: &str) -> DatasetInput {
        DatasetInput {
            label: "d".into(),
            data: serde_json::from_str(json).expect("data"),
            attributes: None,
        }
    }

    const LABELS: &str = r#"[{"label": "2020", "children": ["Q1", "Q2"]}, {"label": "2021", "children": ["Q1"]}]"#;
    const DATA: &str = r#"[{"value": 3, "children": [1, 2]}, {"value": 5, "children": [5]}]"#;

    #[test]
    fn test_update_projects_datasets() {
        let mut engine = AxisEngine::new(AxisOptions::default()).expect("engine");
        let rebuilt = engine.update(&labels(LABELS), vec![dataset(DATA)]).expect("update");

        assert!(rebuilt);
        assert_eq!(engine.visible_labels(), vec!["Q1", "Q2", "Q1"]);
        assert_eq!(engine.dataset(0).expect("dataset").values(), &[Some(1.0), Some(2.0), Some(5.0)]);
        assert!(is_valid_cut(engine.tree(), engine.visible()));
    }

    #[test]
    fn test_unchanged_labels_keep_state() {
        let mut engine = AxisEngine::new(AxisOptions::default()).expect("engine");
        engine.update(&labels(LABELS), vec![dataset(DATA)]).expect("update");
        engine.collapse(engine.tree().roots()[0]).expect("collapse");

        let rebuilt = engine
            .update(&labels(LABELS), vec![dataset(r#"[{"value": 30, "children": [1, 2]}, {"children": [50]}]"#)])
            .expect("second update");
        assert!(!rebuilt, "labels unchanged");
        assert_eq!(engine.visible_labels(), vec!["2020", "Q1"], "collapse survives");
        assert_eq!(engine.dataset(0).expect("dataset").values(), &[Some(30.0), Some(50.0)]);
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let mut engine = AxisEngine::new(AxisOptions::default()).expect("engine");
        engine.update(&labels(LABELS), vec![dataset(DATA)]).expect("update");

        let err = engine
            .update(&labels(r#"["A", "B"]"#), vec![dataset("[1]")])
            .expect_err("shape mismatch");
        assert!(matches!(err, AxisError::Data(_)));
        assert_eq!(engine.visible_labels(), vec!["Q1", "Q2", "Q1"]);

        let rebuilt = engine
            .update(&labels(r#"["A", "B"]"#), vec![dataset("[1, 2]")])
            .expect("valid update");
        assert!(rebuilt, "rejected labels must not be treated as current");
    }

    #[test]
    fn test_hidden_mirrors_visibility() {
        let mut engine = AxisEngine::new(AxisOptions::default()).expect("engine");
        engine
            .update(&labels(r#"[{"label": "A", "expand": false, "children": ["a"]}, "B"]"#), vec![])
            .expect("update");
        let hidden: Vec<bool> = engine.tree().nodes().iter().map(|n| n.hidden).collect();
        assert_eq!(hidden, vec![false, true, false]);
    }

    #[test]
    fn test_layout_and_relayout_after_transition() {
        let mut engine = AxisEngine::new(AxisOptions::default()).expect("engine");
        engine.update(&labels(LABELS), vec![]).expect("update");
        assert!(engine.ticks().is_empty(), "no layout before the first pass");

        assert_eq!(engine.layout(0.0, 300.0).len(), 3);
        engine.collapse(engine.tree().roots()[0]).expect("collapse");
        assert_eq!(engine.ticks().len(), 2, "geometry follows the visible sequence");
        assert_eq!(engine.pixel_to_index(1.0), Some(0));
        assert_eq!(engine.pixel_to_index(400.0), None);
    }

    #[test]
    fn test_dataset_attributes_collapse() {
        let options: AxisOptions =
            serde_json::from_value(json!({"attributes": {"backgroundColor": "gray", "borderWidth": 1}}))
                .expect("options");
        let mut engine = AxisEngine::new(options).expect("engine");
        engine
            .update(
                &labels(r#"[{"label": "A", "backgroundColor": "red", "children": ["a1"]}, "B"]"#),
                vec![dataset("[{\"children\": [1]}, 2]")],
            )
            .expect("update");
        assert_eq!(
            serde_json::to_value(engine.dataset_attributes(0).expect("attributes")).expect("json"),
            json!({"backgroundColor": ["red", "gray"], "borderWidth": 1})
        );
        assert!(matches!(engine.dataset_attributes(4), Err(AxisError::UnknownDataset(4))));
    }

    #[test]
    fn test_static_axis_ignores_pointer() {
        let options = AxisOptions {
            static_axis: true,
            ..Default::default()
        };
        let mut engine = AxisEngine::new(options).expect("engine");
        engine.update(&labels(LABELS), vec![]).expect("update");
        let center = engine.layout(0.0, 300.0)[0].center;
        assert_eq!(engine.hit_test(center, 20.0, 0.0), None);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = AxisOptions {
            level_percentage: 2.0,
            ..Default::default()
        };
        assert!(matches!(AxisEngine::new(options), Err(AxisError::Config(_))));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut engine = AxisEngine::new(AxisOptions::default()).expect("engine");
        engine.update(&labels(LABELS), vec![dataset(DATA)]).expect("update");
        engine.collapse(engine.tree().roots()[1]).expect("collapse");
        let snapshot = engine.snapshot();

        let mut other = AxisEngine::new(AxisOptions::default()).expect("engine");
        other.update(&labels(LABELS), vec![dataset(DATA)]).expect("update");
        other.restore(&snapshot).expect("restore");

        assert_eq!(other.visible(), engine.visible());
        assert_eq!(other.dataset(0).expect("d").values(), engine.dataset(0).expect("d").values());
        assert_eq!(other.visible_labels(), vec!["Q1", "Q2", "2021"]);
    }
}
