//! Solver configuration and per-run simulation context.
//!
//! [`SolverConfig`] carries every tunable constant of the solver with
//! defaults suited to estuarine models in metres and seconds. It follows the
//! usual builder pattern:
//!
//! ```
//! use tidal_fe::config::SolverConfig;
//! use tidal_fe::source::FrictionLaw;
//!
//! let config = SolverConfig::default()
//!     .with_watt(0.05)
//!     .with_latitude(53.5)
//!     .with_friction(FrictionLaw::Strickler, 40.0);
//! assert_eq!(config.half_watt(), 0.025);
//! ```
//!
//! [`SimulationContext`] is the small bundle of read-mostly values that every
//! phase of a step needs: the current time, the step counter, gravity and the
//! wetting thresholds. It is passed by reference instead of living in
//! process-wide state.

use crate::error::{Result, SolverError};
use crate::source::{DragCoefficient, FrictionLaw, RHO_AIR, RHO_WATER};

/// Angular velocity of the Earth (rad/s).
pub const EARTH_ROTATION: f64 = 7.2921e-5;

/// Order in which elements are visited during assembly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssemblyOrder {
    /// Ascending element numbers.
    #[default]
    Forward,
    /// Descending element numbers. Results must agree with `Forward` up to
    /// floating-point summation order.
    Reverse,
}

/// Tunable parameters of the current solver.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Gravitational acceleration (m/s²)
    pub g: f64,
    /// Wetting threshold WATT (m): nodes shallower than this are dry
    pub watt: f64,
    /// Latitude for the Coriolis parameter (degrees)
    pub latitude: f64,
    /// Bed friction law
    pub friction: FrictionLaw,
    /// Roughness used where no valid per-node value is available
    /// (k_s in metres for Nikuradse, k_st in m^(1/3)/s for Strickler)
    pub default_roughness: f64,
    /// Wind drag formulation
    pub drag: DragCoefficient,
    /// Air density (kg/m³)
    pub rho_air: f64,
    /// Water density (kg/m³)
    pub rho_water: f64,
    /// Smagorinsky constant C_s
    pub smagorinsky: f64,
    /// Lower bound on horizontal eddy viscosity (m²/s)
    pub min_horizontal_viscosity: f64,
    /// Lower bound on vertical eddy viscosity (m²/s)
    pub min_vertical_viscosity: f64,
    /// Vertical velocity injected on fully dry elements (m/s)
    pub seepage_rate: f64,
    /// Water-level loss rate on wet nodes (m/s)
    pub infiltration_rate: f64,
    /// Relaxation fraction toward a neighbour that is itself extrapolated
    pub extrapolation_relaxation: f64,
    /// Relaxation fraction toward a neighbour that is not extrapolated
    pub free_neighbour_relaxation: f64,
    /// Relaxation fraction of marginally dry nodes toward the lowest neighbour
    pub dry_relaxation: f64,
    /// Magnitude above which a state value counts as diverged
    pub divergence_threshold: f64,
    /// Reject boundary assignments naming unknown nodes instead of dropping them
    pub strict_boundary_nodes: bool,
    /// Upper bound on the time step chosen by [`advance`](crate::CurrentSolver::advance) (s)
    pub dt_max: f64,
    /// Fraction of the admissible step taken by [`advance`](crate::CurrentSolver::advance)
    pub courant: f64,
    /// Element traversal order during assembly
    pub assembly_order: AssemblyOrder,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            g: 9.81,
            watt: 0.1,
            latitude: 0.0,
            friction: FrictionLaw::Nikuradse,
            default_roughness: 0.01,
            drag: DragCoefficient::default(),
            rho_air: RHO_AIR,
            rho_water: RHO_WATER,
            smagorinsky: 0.1,
            min_horizontal_viscosity: 1.0e-3,
            min_vertical_viscosity: 1.0e-4,
            seepage_rate: 1.0e-5,
            infiltration_rate: 0.0,
            extrapolation_relaxation: 0.01,
            free_neighbour_relaxation: 0.05,
            dry_relaxation: 0.01,
            divergence_threshold: 1.0e5,
            strict_boundary_nodes: false,
            dt_max: 60.0,
            courant: 0.25,
            assembly_order: AssemblyOrder::Forward,
        }
    }
}

impl SolverConfig {
    /// Set gravitational acceleration.
    pub fn with_gravity(mut self, g: f64) -> Self {
        self.g = g;
        self
    }

    /// Set the wetting threshold WATT.
    pub fn with_watt(mut self, watt: f64) -> Self {
        self.watt = watt;
        self
    }

    /// Set latitude in degrees.
    pub fn with_latitude(mut self, latitude: f64) -> Self {
        self.latitude = latitude;
        self
    }

    /// Set the friction law together with its default roughness.
    pub fn with_friction(mut self, law: FrictionLaw, default_roughness: f64) -> Self {
        self.friction = law;
        self.default_roughness = default_roughness;
        self
    }

    /// Set the wind drag formulation.
    pub fn with_drag(mut self, drag: DragCoefficient) -> Self {
        self.drag = drag;
        self
    }

    /// Set the Smagorinsky constant.
    pub fn with_smagorinsky(mut self, cs: f64) -> Self {
        self.smagorinsky = cs;
        self
    }

    /// Set the seepage velocity for fully dry elements.
    pub fn with_seepage_rate(mut self, rate: f64) -> Self {
        self.seepage_rate = rate;
        self
    }

    /// Set the infiltration rate for wet nodes.
    pub fn with_infiltration_rate(mut self, rate: f64) -> Self {
        self.infiltration_rate = rate;
        self
    }

    /// Set the divergence threshold.
    pub fn with_divergence_threshold(mut self, threshold: f64) -> Self {
        self.divergence_threshold = threshold;
        self
    }

    /// Reject unknown boundary nodes.
    pub fn with_strict_boundary_nodes(mut self, strict: bool) -> Self {
        self.strict_boundary_nodes = strict;
        self
    }

    /// Set the maximum time step used by adaptive stepping.
    pub fn with_dt_max(mut self, dt_max: f64) -> Self {
        self.dt_max = dt_max;
        self
    }

    /// Set the fraction of the admissible step used by adaptive stepping.
    pub fn with_courant(mut self, courant: f64) -> Self {
        self.courant = courant;
        self
    }

    /// Set the element traversal order.
    pub fn with_assembly_order(mut self, order: AssemblyOrder) -> Self {
        self.assembly_order = order;
        self
    }

    /// Check that every parameter lies in its admissible range.
    ///
    /// # Errors
    /// [`SolverError::InvalidConfig`] naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        fn check(name: &str, value: f64, ok: bool) -> Result<()> {
            if value.is_finite() && ok {
                Ok(())
            } else {
                Err(SolverError::InvalidConfig(format!("{name} = {value}")))
            }
        }
        check("g", self.g, self.g > 0.0)?;
        check("watt", self.watt, self.watt > 0.0)?;
        check("latitude", self.latitude, self.latitude.abs() <= 90.0)?;
        check("default_roughness", self.default_roughness, self.default_roughness > 0.0)?;
        check("rho_air", self.rho_air, self.rho_air > 0.0)?;
        check("rho_water", self.rho_water, self.rho_water > 0.0)?;
        check("smagorinsky", self.smagorinsky, self.smagorinsky >= 0.0)?;
        check(
            "min_horizontal_viscosity",
            self.min_horizontal_viscosity,
            self.min_horizontal_viscosity >= 0.0,
        )?;
        check(
            "min_vertical_viscosity",
            self.min_vertical_viscosity,
            self.min_vertical_viscosity >= 0.0,
        )?;
        check("seepage_rate", self.seepage_rate, self.seepage_rate >= 0.0)?;
        check("infiltration_rate", self.infiltration_rate, self.infiltration_rate >= 0.0)?;
        for (name, fraction) in [
            ("extrapolation_relaxation", self.extrapolation_relaxation),
            ("free_neighbour_relaxation", self.free_neighbour_relaxation),
            ("dry_relaxation", self.dry_relaxation),
        ] {
            check(name, fraction, (0.0..=1.0).contains(&fraction))?;
        }
        check("divergence_threshold", self.divergence_threshold, self.divergence_threshold > 0.0)?;
        check("dt_max", self.dt_max, self.dt_max > 0.0)?;
        check("courant", self.courant, self.courant > 0.0 && self.courant <= 1.0)?;
        Ok(())
    }

    /// Half the wetting threshold; below it a node counts as fully dry.
    #[inline]
    pub fn half_watt(&self) -> f64 {
        0.5 * self.watt
    }

    /// Coriolis parameter f = 2Ω sin(φ).
    pub fn coriolis_parameter(&self) -> f64 {
        2.0 * EARTH_ROTATION * self.latitude.to_radians().sin()
    }
}

/// Values shared by all phases of a time step.
#[derive(Clone, Debug)]
pub struct SimulationContext {
    /// Current simulation time (s)
    pub time: f64,
    /// Number of completed steps
    pub step: u64,
    /// Gravitational acceleration (m/s²)
    pub g: f64,
    /// Wetting threshold (m)
    pub watt: f64,
    /// Half the wetting threshold (m)
    pub half_watt: f64,
    /// Coriolis parameter (1/s)
    pub coriolis: f64,
}

impl SimulationContext {
    /// Context at t = 0 for the given configuration.
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            time: 0.0,
            step: 0,
            g: config.g,
            watt: config.watt,
            half_watt: config.half_watt(),
            coriolis: config.coriolis_parameter(),
        }
    }

    /// True until the first step has completed. Adams-Bashforth uses the
    /// current tendency in place of the missing previous one.
    #[inline]
    pub fn is_first_step(&self) -> bool {
        self.step == 0
    }

    /// Move the clock forward after a successful step.
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
        self.step += 1;
    }
}
