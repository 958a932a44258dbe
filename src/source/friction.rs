//! Bed friction.
//!
//! The bed layer feels a quadratic drag `τ/ρ = c_f |u| u`. The coefficient
//! follows one of two laws, chosen per simulation:
//!
//! - **Nikuradse** (log law, roughness length k_s in metres):
//!   `c_f = (κ / ln(30 z / k_s))²` with `z` the height of the velocity above
//!   the bed.
//! - **Strickler** (empirical k_st in m^(1/3)/s):
//!   `c_f = g / (k_st² H^(1/3))`.
//!
//! Coefficients are clamped to `[0, 0.1]` and are zero below the wetting
//! threshold. The bed shear reported to coupled models averages a
//! depth-averaged estimate and a near-bed log-law estimate.

use super::turbulence::KAPPA;

/// Largest admissible friction coefficient.
pub const MAX_FRICTION_COEFFICIENT: f64 = 0.1;

/// Height of the near-bed band used for the bed shear estimate (m).
pub const NEAR_BED_BAND: f64 = 1.0;

/// Bed friction law.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrictionLaw {
    /// Log law with roughness length k_s (m)
    #[default]
    Nikuradse,
    /// Strickler coefficient k_st (m^(1/3)/s)
    Strickler,
}

/// Friction law bound to gravity, wetting threshold and default roughness.
#[derive(Clone, Copy, Debug)]
pub struct BedFriction {
    /// Friction law
    pub law: FrictionLaw,
    /// Gravitational acceleration (m/s²)
    pub g: f64,
    /// Wetting threshold (m)
    pub watt: f64,
    /// Roughness used for missing or invalid node values
    pub default_roughness: f64,
}

impl BedFriction {
    /// Create a friction evaluator.
    pub fn new(law: FrictionLaw, g: f64, watt: f64, default_roughness: f64) -> Self {
        Self {
            law,
            g,
            watt,
            default_roughness,
        }
    }

    /// Replace non-finite or non-positive roughness with the default.
    #[inline]
    pub fn resolve_roughness(&self, roughness: f64) -> f64 {
        if roughness.is_finite() && roughness > 0.0 {
            roughness
        } else {
            self.default_roughness
        }
    }

    /// Coefficient for a velocity `height` metres above the bed.
    ///
    /// # Arguments
    /// * `roughness` - k_s or k_st depending on the law
    /// * `depth` - Total water depth (m)
    /// * `height` - Height of the velocity point above the bed (m)
    pub fn coefficient(&self, roughness: f64, depth: f64, height: f64) -> f64 {
        if !(depth >= self.watt) {
            return 0.0;
        }
        let roughness = self.resolve_roughness(roughness);
        let cf = match self.law {
            FrictionLaw::Nikuradse => {
                let arg = (30.0 * height / roughness).max(std::f64::consts::E);
                (KAPPA / arg.ln()).powi(2)
            }
            FrictionLaw::Strickler => self.g / (roughness * roughness * depth.cbrt()),
        };
        cf.clamp(0.0, MAX_FRICTION_COEFFICIENT)
    }

    /// Coefficient for the depth-averaged velocity.
    ///
    /// The log profile reaches its depth mean at `H / e` above the bed.
    pub fn depth_averaged_coefficient(&self, roughness: f64, depth: f64) -> f64 {
        self.coefficient(roughness, depth, depth / std::f64::consts::E)
    }

    /// Kinematic bed shear stress (τx, τy, |τ|).
    ///
    /// # Arguments
    /// * `roughness` - Node roughness
    /// * `depth` - Total water depth (m)
    /// * `mean` - Depth-averaged velocity
    /// * `near_bed` - Mean velocity over the lowest [`NEAR_BED_BAND`] metres
    pub fn bed_shear(
        &self,
        roughness: f64,
        depth: f64,
        mean: (f64, f64),
        near_bed: (f64, f64),
    ) -> [f64; 3] {
        if !(depth >= self.watt) {
            return [0.0; 3];
        }
        let cf_mean = self.depth_averaged_coefficient(roughness, depth);
        let band = NEAR_BED_BAND.min(depth);
        let cf_bed = self.coefficient(roughness, depth, 0.5 * band);

        let s_mean = mean.0.hypot(mean.1);
        let s_bed = near_bed.0.hypot(near_bed.1);
        let tx = 0.5 * (cf_mean * s_mean * mean.0 + cf_bed * s_bed * near_bed.0);
        let ty = 0.5 * (cf_mean * s_mean * mean.1 + cf_bed * s_bed * near_bed.1);
        [tx, ty, tx.hypot(ty)]
    }
}
