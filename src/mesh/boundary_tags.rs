//! Boundary tags for mesh edges.
//!
//! Every edge owned by a single triangle lies on the domain boundary. Closed
//! edges are impermeable walls: nodes on them lose their wall-normal velocity.
//! Open edges carry prescribed water levels, velocities or discharges.

/// Tag identifying the type of a boundary edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryTag {
    /// Solid wall (no normal flow)
    #[default]
    Wall,

    /// Open boundary (forced or free)
    Open,
}

impl BoundaryTag {
    /// Check if this is a solid wall.
    pub fn is_wall(&self) -> bool {
        matches!(self, BoundaryTag::Wall)
    }

    /// Check if this is an open boundary.
    pub fn is_open(&self) -> bool {
        matches!(self, BoundaryTag::Open)
    }
}
