//! The hierarchy axis engine and its state machine.

mod diff;
mod engine;
mod transitions;

pub use diff::VisibilityDiff;
pub use engine::AxisEngine;
