//! Layout algorithms for the hierarchy axis.
//!
//! This module provides the CPU-side geometry that the host's renderer
//! consumes: tick centers and widths for the visible nodes, and group spans
//! for brackets, labels and toggle controls.

pub mod span;
pub mod ticks;

pub use span::{GroupSpan, descendant_span, span_logic};
pub use ticks::{TickGeometry, TickLayout, pixel_to_index};
