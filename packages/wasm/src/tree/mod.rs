//! Label tree data structures and operations.
//!
//! This module provides the flat, index-addressed node table for the axis
//! hierarchy, the builder that produces it from nested host input, the
//! visibility cut, attribute inheritance and expand-state snapshots.

pub mod attributes;
pub mod builder;
mod node;
pub mod snapshot;
mod table;
pub mod visibility;

pub use builder::{LabelDescriptor, LabelInput, TreeBuilder};
pub use node::{ExpandFlag, ExpandState, Node, NodeIndex};
pub use table::{Ancestors, LabelTree};
