//! Strongly-typed identifiers shared across the solver.

mod indices;

pub use indices::{ElementIndex, LayerIndex, NodeIndex};
