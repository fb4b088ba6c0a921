//! Pointer hit testing over the hierarchy band.
//!
//! Resolves a pointer position to the state transition its control
//! represents, using the tick geometry of the last layout pass.


pub use hit_test::{HierarchyBand, Interaction, InteractionKind, resolve_interaction};
