//! Dataset value stores.
//!
//! Each dataset owns a shadow tree mirroring the label hierarchy and a flat
//! value array projected from it over the visible sequence.

mod series;
mod shadow;

pub use series::{Dataset, DatasetInput};
pub use shadow::{ShadowTree, ValueNode};
