//! Explicit time integration.
//!
//! [`CurrentSolver`] owns the mesh, node states and collaborators and runs
//! one step as boundary pass, element assembly and node update. The update
//! integrates velocities and levels with a two-level Adams-Bashforth
//! correction and checks every candidate value for divergence.

mod divergence;
mod integrator;
mod update;

pub use divergence::{Divergence, DivergenceCheck};
pub use integrator::{CurrentSolver, IntegratorPhase, StepReport};
