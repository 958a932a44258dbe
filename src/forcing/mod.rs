//! Boundary forcing: time functions, spatial profiles and controllers.
//!
//! A node can carry at most one [`BoundaryForcing`]:
//!
//! - **Level**: water level from a [`TimeFunction`] plus a fixed per-node
//!   offset (usually sampled from a [`SpatialProfile`]).
//! - **Velocity**: velocity components, applied uniformly to all wet layers.
//! - **ControlledDischarge**: the velocity follows the discharge returned by
//!   the solver's [`DischargeController`].
//! - **FlowRate**: a total discharge through a boundary section of given
//!   width, turned into velocity with the local depth.

mod controller;
mod profile;
mod table;
mod tidal;
mod time_function;

pub use controller::{DischargeController, LevelController};
pub use profile::SpatialProfile;
pub use table::TimeTable;
pub use tidal::{HarmonicSeries, TidalConstituent};
pub use time_function::{ForcingValue, ScalarController, TimeFunction};

/// Forcing attached to a boundary node.
#[derive(Clone, Debug)]
pub enum BoundaryForcing {
    /// Prescribed water level.
    Level {
        /// Level above datum as a function of time (m)
        function: TimeFunction,
        /// Offset added at this node (m)
        offset: f64,
    },
    /// Prescribed velocity.
    Velocity {
        /// Eastward velocity (m/s)
        u: TimeFunction,
        /// Northward velocity (m/s)
        v: TimeFunction,
    },
    /// Velocity from the discharge controller.
    ControlledDischarge,
    /// Total discharge through a section, applied when the node is wet.
    FlowRate {
        /// Discharge (m³/s)
        discharge: TimeFunction,
        /// Section width (m)
        width: f64,
        /// Unit flow direction
        direction: (f64, f64),
    },
}

impl BoundaryForcing {
    /// Level forcing without offset.
    pub fn level(function: TimeFunction) -> Self {
        BoundaryForcing::Level {
            function,
            offset: 0.0,
        }
    }

    /// Whether the forcing fixes the water level.
    pub fn prescribes_level(&self) -> bool {
        matches!(self, BoundaryForcing::Level { .. })
    }

    /// Prescribed level and its rate of change at time `t`, if any.
    pub fn level_at(&self, t: f64) -> Option<ForcingValue> {
        match self {
            BoundaryForcing::Level { function, offset } => {
                let mut f = function.evaluate(t);
                f.value += offset;
                Some(f)
            }
            _ => None,
        }
    }
}
