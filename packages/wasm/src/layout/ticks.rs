//! Non-uniform tick layout for the visible sequence.
//!
//! Uniform spacing would hide the hierarchy, so the gap between two adjacent
//! visible nodes shrinks with how deep they are related: the gap is
//! `ratio^c`, where `c` is the position at which the two nodes' root-to-node
//! ancestor chains first differ. Siblings share everything up to their own
//! level, so for them `c` is the child's level; for nodes under different
//! parents `c` is the depth of their lowest common ancestor's children.
//!
//! # Algorithm
//!
//! 1. Build the distance array: `0.5`, one gap per adjacent pair, `0.5`.
//! 2. `scale = length / sum(distances)`.
//! 3. Walk the nodes, advancing a running offset by each scaled distance to
//!    get the centers; the half-width is half the smaller neighbouring gap.
//!    The outer half-distances count as a full gap for the edge nodes, so a
//!    flat axis is tiled exactly.
//!
//! Depth is unbounded; `ratio^c` is evaluated for any `c`.

use serde::Serialize;

use crate::tree::{LabelTree, NodeIndex};

/// Fixed distance before the first and after the last node.
const EDGE_DISTANCE: f32 = 0.5;

/// Geometry of one visible node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickGeometry {
    pub node: NodeIndex,
    /// The tick value, i.e. the node's label.
    pub value: String,
    pub center: f32,
    /// Half-extent of the tick along the axis.
    pub width: f32,
}

impl TickGeometry {
    /// Inclusive on both ends.
    #[inline]
    pub fn contains(&self, pixel: f32) -> bool {
        pixel >= self.center - self.width && pixel <= self.center + self.width
    }
}

/// Tick layout parameters for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickLayout {
    /// Pixel coordinate where the axis starts.
    pub start: f32,
    /// Axis length in pixels.
    pub length: f32,
    /// Shrink ratio per nesting level.
    pub ratio: f32,
}

impl TickLayout {
    pub fn new(start: f32, length: f32, ratio: f32) -> Self {
        Self {
            start,
            length,
            ratio,
        }
    }

    /// Distances between consecutive visible nodes, edges included.
    ///
    /// For `n` nodes the result has `n + 1` entries; it is empty for an empty
    /// sequence.
    pub fn distances(&self, tree: &LabelTree, visible: &[NodeIndex]) -> Vec<f32> {
        if visible.is_empty() {
            return Vec::new();
        }
        let mut distances = Vec::with_capacity(visible.len() + 1);
        distances.push(EDGE_DISTANCE);

        let mut prev_chain = tree.lineage(visible[0]);
        for &index in &visible[1..] {
            let chain = tree.lineage(index);
            let depth = divergence(&prev_chain, &chain);
            distances.push(self.ratio.powi(depth as i32));
            prev_chain = chain;
        }

        distances.push(EDGE_DISTANCE);
        distances
    }

    /// Compute geometry for the visible sequence.
    pub fn compute(&self, tree: &LabelTree, visible: &[NodeIndex]) -> Vec<TickGeometry> {
        let distances = self.distances(tree, visible);
        if distances.is_empty() {
            return Vec::new();
        }

        let total: f32 = distances.iter().sum();
        let scale = self.length / total;
        let last = visible.len() - 1;

        let mut offset = self.start;
        let mut ticks = Vec::with_capacity(visible.len());
        for (i, &index) in visible.iter().enumerate() {
            offset += distances[i] * scale;
            let prev_gap = if i == 0 { 2.0 * distances[0] } else { distances[i] };
            let next_gap = if i == last {
                2.0 * distances[i + 1]
            } else {
                distances[i + 1]
            };
            ticks.push(TickGeometry {
                node: index,
                value: tree.node(index).label.clone(),
                center: offset,
                width: prev_gap.min(next_gap) * scale / 2.0,
            });
        }
        ticks
    }

    /// Compute geometry and write `center`/`width` back onto the tree nodes.
    pub fn apply(&self, tree: &mut LabelTree, visible: &[NodeIndex]) -> Vec<TickGeometry> {
        let ticks = self.compute(tree, visible);
        for tick in &ticks {
            let node = tree.node_mut(tick.node);
            node.center = tick.center;
            node.width = tick.width;
        }
        ticks
    }
}

/// First position at which two root-to-node chains differ.
fn divergence(a: &[NodeIndex], b: &[NodeIndex]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Map a pixel back to the visible index whose span contains it.
///
/// Linear scan; the first matching span wins on shared boundaries.
pub fn pixel_to_index(ticks: &[TickGeometry], pixel: f32) -> Option<usize> {
    ticks.iter().position(|tick| tick.contains(pixel))
}
