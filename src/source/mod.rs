//! Physical source terms of the momentum equations.
//!
//! - [`friction`]: bed friction (Nikuradse or Strickler) and bed shear
//! - [`wind_stress`]: quadratic surface wind drag
//! - [`turbulence`]: Smagorinsky/Elder horizontal and mixing-length vertical
//!   eddy viscosity
//! - [`radiation`]: wave radiation-stress forcing
//!
//! Coriolis acceleration needs only the parameter `f`, see
//! [`SolverConfig::coriolis_parameter`](crate::config::SolverConfig::coriolis_parameter).

pub mod friction;
pub mod radiation;
pub mod turbulence;
pub mod wind_stress;

pub use friction::{BedFriction, FrictionLaw, MAX_FRICTION_COEFFICIENT, NEAR_BED_BAND};
pub use radiation::radiation_acceleration;
pub use turbulence::{KAPPA, TurbulenceClosure};
pub use wind_stress::{DragCoefficient, RHO_AIR, RHO_WATER, WindStress};
