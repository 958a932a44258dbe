//! Named per-layer channels of a node.

/// A per-layer quantity stored at every node.
///
/// Velocities are in m/s; `W` is the vertical velocity at the top of the
/// layer, positive downward. Residual channels accumulate mass-weighted
/// tendencies during assembly and are cleared at the start of each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantity {
    /// Eastward velocity
    U,
    /// Northward velocity
    V,
    /// Vertical velocity at the layer top (positive downward)
    W,
    /// Layer discharge u·d
    Qx,
    /// Layer discharge v·d
    Qy,
    /// Previous eastward acceleration (Adams-Bashforth history)
    DuDt,
    /// Previous northward acceleration (Adams-Bashforth history)
    DvDt,
    /// Assembled eastward momentum residual
    ResidualU,
    /// Assembled northward momentum residual
    ResidualV,
    /// Assembled vertical-velocity residual
    ResidualW,
    /// Layer thickness
    Thickness,
    /// ∂u/∂z
    DuDz,
    /// ∂v/∂z
    DvDz,
    /// ∂²u/∂z²
    D2uDz2,
    /// ∂²v/∂z²
    D2vDz2,
    /// Bed friction coefficient (bed layer only)
    Friction,
    /// Kinematic wind stress, x (surface layer only)
    WindX,
    /// Kinematic wind stress, y (surface layer only)
    WindY,
}

impl Quantity {
    /// Every channel, in storage order.
    pub const ALL: [Quantity; 18] = [
        Quantity::U,
        Quantity::V,
        Quantity::W,
        Quantity::Qx,
        Quantity::Qy,
        Quantity::DuDt,
        Quantity::DvDt,
        Quantity::ResidualU,
        Quantity::ResidualV,
        Quantity::ResidualW,
        Quantity::Thickness,
        Quantity::DuDz,
        Quantity::DvDz,
        Quantity::D2uDz2,
        Quantity::D2vDz2,
        Quantity::Friction,
        Quantity::WindX,
        Quantity::WindY,
    ];

    /// True for the channels cleared at the start of every step.
    pub fn is_residual(self) -> bool {
        matches!(
            self,
            Quantity::ResidualU | Quantity::ResidualV | Quantity::ResidualW
        )
    }
}
