//! Hierarchy Axis - WASM Module
//!
//! This module provides the core of a collapsible hierarchical chart axis:
//! the label tree, its visible cut, the expand/collapse/zoom state machine,
//! tick geometry and pointer hit testing. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen. Rendering stays on
//! the host side.
//!
//! # Architecture
//!
//! - `tree`: flat label tree, builder, visibility cut, attribute inheritance
//! - `dataset`: shadow trees and value arrays aligned with the visible cut
//! - `axis`: the engine aggregate and its state machine
//! - `layout`: tick centers/widths and group spans
//! - `spatial`: hierarchy band hit testing
//! - `config`, `error`, `logging`: options, error types, console logger

use js_sys::{Float32Array, Float64Array, Uint32Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod axis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod logging;
pub mod spatial;
pub mod tree;

use axis::AxisEngine;
use config::AxisOptions;
use dataset::DatasetInput;
use spatial::Interaction;
use tree::snapshot::ExpandSnapshot;
use tree::{ExpandState, LabelInput, NodeIndex};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Serialize for the host. Maps become plain objects, `None` becomes `null`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Host view of one label node.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeView<'a> {
    label: &'a str,
    /// -1 for roots.
    parent: i64,
    children: &'a [NodeIndex],
    level: usize,
    rel_index: usize,
    expand: ExpandState,
    hidden: bool,
    center: f32,
    width: f32,
}

/// Main entry point for the hierarchy axis.
///
/// This struct wraps the internal AxisEngine and provides the public API
/// exposed to JavaScript. Node ids are the stable indices of the flat label
/// table; they are reassigned only when the labels change.
#[wasm_bindgen]
pub struct HierarchyAxisWasm {
    engine: AxisEngine,
}

#[wasm_bindgen]
impl HierarchyAxisWasm {
    /// Create an axis from an options object (`undefined` for defaults).
    ///
    /// Also installs the console logger at the configured `logLevel`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<HierarchyAxisWasm, JsError> {
        let options: AxisOptions = if options.is_undefined() || options.is_null() {
            AxisOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        logging::init(options.log_filter());
        Ok(Self {
            engine: AxisEngine::new(options)?,
        })
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Apply chart data: the label tree and the datasets.
    ///
    /// Returns true if the label tree was rebuilt, false if the labels were
    /// unchanged and the current expand/zoom state was kept.
    pub fn update(&mut self, labels: JsValue, datasets: JsValue) -> Result<bool, JsError> {
        let labels: Vec<LabelInput> = serde_wasm_bindgen::from_value(labels)?;
        let datasets: Vec<DatasetInput> = if datasets.is_undefined() || datasets.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(datasets)?
        };
        Ok(self.engine.update(&labels, datasets)?)
    }

    /// Node ids of the visible sequence, in axis order.
    #[wasm_bindgen(js_name = visibleIndices)]
    pub fn visible_indices(&self) -> Uint32Array {
        let ids: Vec<u32> = self.engine.visible().iter().map(|i| i.raw()).collect();
        Uint32Array::from(&ids[..])
    }

    /// Labels of the visible sequence, in axis order.
    #[wasm_bindgen(js_name = visibleLabels)]
    pub fn visible_labels(&self) -> Vec<String> {
        self.engine.visible_labels()
    }

    /// Number of nodes in the label tree (visible or not).
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.engine.tree().len()
    }

    /// Describe one node, or throw for an unknown id.
    #[wasm_bindgen(js_name = nodeInfo)]
    pub fn node_info(&self, id: u32) -> Result<JsValue, JsError> {
        let index = NodeIndex(id);
        let node = self
            .engine
            .tree()
            .get(index)
            .ok_or(error::AxisError::UnknownNode(index))?;
        to_js(&NodeView {
            label: &node.label,
            parent: node.parent.map_or(-1, |p| i64::from(p.raw())),
            children: &node.children,
            level: node.level,
            rel_index: node.rel_index,
            expand: node.expand,
            hidden: node.hidden,
            center: node.center,
            width: node.width,
        })
    }

    #[wasm_bindgen(js_name = datasetCount)]
    pub fn dataset_count(&self) -> usize {
        self.engine.datasets().len()
    }

    /// Values of one dataset aligned with the visible sequence. Missing
    /// values are NaN.
    #[wasm_bindgen(js_name = datasetValues)]
    pub fn dataset_values(&self, index: usize) -> Result<Float64Array, JsError> {
        let values: Vec<f64> = self
            .engine
            .dataset(index)?
            .values()
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(Float64Array::from(&values[..]))
    }

    /// Resolved attributes of one dataset; uniform arrays are collapsed to a
    /// single value.
    #[wasm_bindgen(js_name = datasetAttributes)]
    pub fn dataset_attributes(&self, index: usize) -> Result<JsValue, JsError> {
        to_js(&self.engine.dataset_attributes(index)?)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the visible sequence along `[start, start + length]`.
    ///
    /// Returns `[center0, width0, center1, width1, ...]`, one pair per
    /// visible node. Later transitions re-run the layout on the same span.
    pub fn layout(&mut self, start: f32, length: f32) -> Float32Array {
        let ticks = self.engine.layout(start, length);
        let mut geometry = Vec::with_capacity(ticks.len() * 2);
        for tick in ticks {
            geometry.push(tick.center);
            geometry.push(tick.width);
        }
        Float32Array::from(&geometry[..])
    }

    /// Visible index whose tick contains `pixel`, or -1.
    #[wasm_bindgen(js_name = pixelToIndex)]
    pub fn pixel_to_index(&self, pixel: f32) -> i32 {
        self.engine
            .pixel_to_index(pixel)
            .map_or(-1, |i| i as i32)
    }

    /// Span of a group in the visible sequence, or `null`.
    #[wasm_bindgen(js_name = groupSpan)]
    pub fn group_span(&self, group: u32) -> Result<JsValue, JsError> {
        to_js(&self.engine.group_span(NodeIndex(group)))
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Resolve a pointer to `{kind, node, anchor}`, or `null`.
    ///
    /// `band_start` is the perpendicular coordinate of the axis line.
    #[wasm_bindgen(js_name = hitTest)]
    pub fn hit_test(&self, x: f32, y: f32, band_start: f32) -> Result<JsValue, JsError> {
        to_js(&self.engine.hit_test(x, y, band_start))
    }

    /// Run an interaction returned by `hitTest`.
    pub fn apply(&mut self, interaction: JsValue) -> Result<(), JsError> {
        let interaction: Interaction = serde_wasm_bindgen::from_value(interaction)?;
        Ok(self.engine.apply(interaction)?)
    }

    pub fn expand(&mut self, node: u32) -> Result<(), JsError> {
        Ok(self.engine.expand(NodeIndex(node))?)
    }

    pub fn collapse(&mut self, node: u32) -> Result<(), JsError> {
        Ok(self.engine.collapse(NodeIndex(node))?)
    }

    /// Focus `node`, keeping only its visible descendants. `anchor` is the
    /// visible index of one of them.
    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self, node: u32, anchor: usize) -> Result<(), JsError> {
        Ok(self.engine.zoom_in(NodeIndex(node), anchor)?)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self, node: u32) -> Result<(), JsError> {
        Ok(self.engine.zoom_out(NodeIndex(node))?)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Expand flags of every group, addressed by path.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.snapshot())
    }

    /// Restore flags captured by `snapshot`, possibly from an earlier build
    /// of the same labels.
    pub fn restore(&mut self, snapshot: JsValue) -> Result<(), JsError> {
        let snapshot: ExpandSnapshot = serde_wasm_bindgen::from_value(snapshot)?;
        Ok(self.engine.restore(&snapshot)?)
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::error::AxisError;
    use crate::spatial::InteractionKind;
    use crate::tree::visibility::is_valid_cut;

    fn engine(labels: &str, data: &[&str]) -> AxisEngine {
        let labels: Vec<LabelInput> = serde_json::from_str(labels).expect("labels");
        let datasets = data
            .iter()
            .enumerate()
            .map(|(i, json)| DatasetInput {
                label: format!("series {i}"),
                data: serde_json::from_str(json).expect("data"),
                attributes: None,
            })
            .collect();
        let mut engine = AxisEngine::new(AxisOptions::default()).expect("engine");
        engine.update(&labels, datasets).expect("update");
        engine
    }

    fn assert_aligned(engine: &AxisEngine) {
        assert!(is_valid_cut(engine.tree(), engine.visible()));
        for dataset in engine.datasets() {
            assert_eq!(dataset.values().len(), engine.visible().len());
        }
    }

    const YEARS: &str = r#"[{"label": "Year", "children": [
        {"label": "2020", "children": ["Q1", "Q2"]},
        {"label": "2021", "children": ["Q1"]}]}]"#;
    const SALES: &str = r#"[{"children": [{"value": 30, "children": [10, 20]}, {"value": 5, "children": [5]}]}]"#;
    const COSTS: &str = r#"[{"children": [{"children": [1, null]}, {"value": 9, "children": [9]}]}]"#;

    /// Three root leaves share the axis evenly.
    #[test]
    fn test_flat_axis_layout() {
        let mut engine = engine(r#"["A", "B", "C"]"#, &[]);
        let ticks = engine.layout(0.0, 300.0).to_vec();

        let centers: Vec<f32> = ticks.iter().map(|t| t.center).collect();
        assert_eq!(centers, vec![50.0, 150.0, 250.0]);
        assert!(ticks.iter().all(|t| (t.width - ticks[0].width).abs() < 1e-4));
        assert_eq!(engine.pixel_to_index(ticks[1].center - ticks[1].width), Some(0), "first match wins");
        assert_eq!(engine.pixel_to_index(ticks[2].center - ticks[2].width + 0.01), Some(2));
    }

    /// Collapse, expand and zoom keep every dataset aligned.
    #[test]
    fn test_full_session() {
        let mut engine = engine(YEARS, &[SALES, COSTS]);
        engine.layout(0.0, 600.0);
        let initial_values: Vec<Vec<Option<f64>>> =
            engine.datasets().iter().map(|d| d.values().to_vec()).collect();
        assert_eq!(initial_values[1], vec![Some(1.0), None, Some(9.0)]);

        let y2020 = engine.tree().find_by_path(&[0, 0]).expect("2020");
        let y2021 = engine.tree().find_by_path(&[0, 1]).expect("2021");

        engine.collapse(y2020).expect("collapse 2020");
        assert_eq!(engine.visible_labels(), vec!["2020", "Q1"]);
        assert_eq!(engine.datasets()[1].values(), &[None, Some(9.0)]);
        assert_aligned(&engine);

        engine.collapse(y2021).expect("collapse 2021");
        engine.expand(y2021).expect("expand 2021");
        assert_eq!(engine.visible().len(), 2);
        engine.expand(y2020).expect("expand 2020");
        assert_aligned(&engine);

        engine.zoom_in(y2020, 1).expect("zoom in");
        assert_eq!(engine.visible_labels(), vec!["Q1", "Q2"]);
        assert_eq!(engine.ticks().len(), 2);
        engine.zoom_out(y2020).expect("zoom out");

        let values: Vec<Vec<Option<f64>>> = engine.datasets().iter().map(|d| d.values().to_vec()).collect();
        assert_eq!(values, initial_values);
        assert_aligned(&engine);
    }

    /// Clicks in the hierarchy band drive the state machine.
    #[test]
    fn test_click_through_session() {
        let mut engine = engine(YEARS, &[SALES]);
        let options = engine.options().clone();
        let row = |r: f32| 200.0 + options.padding + options.row_height * (r + 0.5);

        engine.layout(0.0, 600.0);
        let first = engine.ticks()[0].center;

        let year_row = engine.hit_test(first, row(0.0), 200.0).expect("collapse year");
        assert_eq!(year_row.kind, InteractionKind::Collapse);
        engine.apply(year_row).expect("apply");
        assert_eq!(engine.visible_labels(), vec!["Year"]);
        assert_eq!(engine.datasets()[0].values(), &[None]);

        let center = engine.ticks()[0].center;
        let expand = engine.hit_test(center, row(0.0), 200.0).expect("expand year");
        assert_eq!(expand.kind, InteractionKind::Expand);
        engine.apply(expand).expect("apply");
        assert_eq!(engine.visible_labels(), vec!["2020", "2021"]);
        assert_eq!(engine.datasets()[0].values(), &[Some(30.0), Some(5.0)]);

        assert_eq!(engine.hit_test(center, 0.0, 200.0), None, "above the band");
        assert_aligned(&engine);
    }

    /// Labels that fail validation leave a working engine.
    #[test]
    fn test_malformed_labels_rejected() {
        let mut engine = engine(YEARS, &[SALES]);
        let bad: Vec<LabelInput> =
            serde_json::from_str(r#"[{"label": "A", "expand": "focus", "children": ["a"]},
                                     {"label": "B", "expand": "focus", "children": ["b"]}]"#)
                .expect("labels");
        assert!(matches!(engine.update(&bad, vec![]), Err(AxisError::Build(_))));
        assert_eq!(engine.visible().len(), 3);
        assert_aligned(&engine);
    }

    const QUARTERS: &str = r#"[
        {"label": "2019", "expand": false, "children": [
            {"label": "H1", "children": ["Q1", "Q2"]},
            {"label": "H2", "children": [{"label": "Q3", "children": ["Jul", "Aug", "Sep"]}, "Q4"]}]},
        {"label": "2020", "children": [
            {"label": "H1", "children": [{"label": "Q1", "children": ["Jan", "Feb"]}, "Q2"]},
            {"label": "H2", "expand": false, "children": ["Q3", "Q4"]}]},
        "2021"]"#;
    const QUARTER_DATA: &str = r#"[
        {"value": 19, "children": [
            {"value": 1, "children": [2, 3]},
            {"children": [{"value": 4, "children": [5, 6, 7]}, 8]}]},
        {"value": 20, "children": [
            {"value": 9, "children": [{"value": 10, "children": [11, null]}, 12]},
            {"value": 13, "children": [14, 15]}]},
        21]"#;

    /// Random clicks over the hierarchy band: every resolved interaction must
    /// apply cleanly and leave the visible sequence, the hidden flags and the
    /// dataset values consistent.
    #[test]
    fn test_random_click_sessions() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        use crate::dataset::{ShadowTree, ValueNode};
        use crate::tree::visibility::resolve;

        const BAND_START: f32 = 400.0;
        let data: Vec<ValueNode> = serde_json::from_str(QUARTER_DATA).expect("data");
        let mut applied = 0;

        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut engine = engine(QUARTERS, &[QUARTER_DATA]);
            let shadow = ShadowTree::new("check", data.clone(), engine.tree()).expect("shadow");
            let options = engine.options().clone();
            engine.layout(0.0, 800.0);

            for step in 0..250 {
                let rows = engine.visible().iter().map(|&i| engine.tree().node(i).level).max().expect("visible") + 1;
                let tick = &engine.ticks()[rng.random_range(0..engine.ticks().len())];
                let x = tick.center + rng.random_range(-0.95f32..0.95) * tick.width;
                let row = rng.random_range(0..=rows) as f32 + rng.random_range(0.05f32..0.95);
                let y = BAND_START + options.padding + row * options.row_height;

                if let Some(hit) = engine.hit_test(x, y, BAND_START) {
                    if let Err(err) = engine.apply(hit) {
                        panic!("seed {seed} step {step}: {hit:?} resolved but failed: {err}");
                    }
                    applied += 1;
                }

                let tree = engine.tree();
                let visible = engine.visible();
                assert!(is_valid_cut(tree, visible), "seed {seed} step {step}: cut");
                assert_eq!(engine.ticks().len(), visible.len(), "seed {seed} step {step}: ticks");
                for index in tree.indices() {
                    assert_eq!(tree.node(index).hidden, !visible.contains(&index), "seed {seed} step {step}: hidden");
                }
                let expected: Vec<Option<f64>> = visible.iter().map(|&i| resolve(tree, i, &shadow)).collect();
                assert_eq!(engine.datasets()[0].values(), &expected[..], "seed {seed} step {step}: values");
            }
        }
        assert!(applied > 200, "sessions should exercise the state machine, applied {applied}");
    }

    /// A focused descriptor starts zoomed in.
    #[test]
    fn test_initial_focus() {
        let engine = engine(
            r#"["X", {"label": "A", "expand": "focus", "children": ["a1", "a2"]}, "Y"]"#,
            &[r#"[1, {"children": [2, 3]}, 4]"#],
        );
        assert_eq!(engine.visible_labels(), vec!["a1", "a2"]);
        assert_eq!(engine.datasets()[0].values(), &[Some(2.0), Some(3.0)]);
        assert!(engine.tree().node(engine.tree().roots()[0]).hidden);
    }
}
