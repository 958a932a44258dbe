//! Eddy viscosity closures.
//!
//! Horizontal mixing combines a Smagorinsky term resolved on the element
//! with Elder's depth-scaled dispersion:
//!
//! ```text
//! ν_h = (C_s √(2A))² |S| + (κ/6) u* H + ν_h,min
//! |S| = √(2 u_x² + 2 v_y² + (u_y + v_x)²)
//! ```
//!
//! Vertical mixing uses a parabolic mixing length,
//! `l_m = κ z √(1 - z/H)` with `z` the height above the bed, plus a
//! wall-layer term `κ u* z` in the bed layer.

/// von Kármán constant.
pub const KAPPA: f64 = 0.41;

/// Horizontal and vertical eddy viscosity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurbulenceClosure {
    /// Smagorinsky constant C_s
    pub smagorinsky: f64,
    /// Horizontal viscosity floor (m²/s)
    pub min_horizontal: f64,
    /// Vertical viscosity floor (m²/s)
    pub min_vertical: f64,
}

impl TurbulenceClosure {
    /// Create a closure.
    pub fn new(smagorinsky: f64, min_horizontal: f64, min_vertical: f64) -> Self {
        Self {
            smagorinsky,
            min_horizontal,
            min_vertical,
        }
    }

    /// Horizontal eddy viscosity on an element.
    ///
    /// # Arguments
    /// * `area` - Element area (m²)
    /// * `grad_u` - (∂u/∂x, ∂u/∂y)
    /// * `grad_v` - (∂v/∂x, ∂v/∂y)
    /// * `shear_velocity` - Bed shear velocity u* (m/s)
    /// * `depth` - Water depth (m)
    pub fn horizontal(
        &self,
        area: f64,
        grad_u: (f64, f64),
        grad_v: (f64, f64),
        shear_velocity: f64,
        depth: f64,
    ) -> f64 {
        let strain = (2.0 * grad_u.0 * grad_u.0
            + 2.0 * grad_v.1 * grad_v.1
            + (grad_u.1 + grad_v.0).powi(2))
        .sqrt();
        let length = self.smagorinsky * (2.0 * area.abs()).sqrt();
        let smagorinsky = length * length * strain;
        let elder = KAPPA / 6.0 * shear_velocity * depth.max(0.0);
        smagorinsky + elder + self.min_horizontal
    }

    /// Vertical eddy viscosity at `height` above the bed.
    ///
    /// # Arguments
    /// * `height` - Height above the bed (m)
    /// * `depth` - Water depth (m)
    /// * `shear` - Vertical shear magnitude |∂U/∂z| (1/s)
    /// * `shear_velocity` - Bed shear velocity u* (m/s)
    /// * `bed_layer` - Whether the point lies in the bed layer
    pub fn vertical(
        &self,
        height: f64,
        depth: f64,
        shear: f64,
        shear_velocity: f64,
        bed_layer: bool,
    ) -> f64 {
        if !(depth > 0.0) {
            return self.min_vertical;
        }
        let z = height.clamp(0.0, depth);
        let mixing_length = KAPPA * z * (1.0 - z / depth).sqrt();
        let mut nu = mixing_length * mixing_length * shear.abs();
        if bed_layer {
            nu += KAPPA * shear_velocity * z;
        }
        nu.max(self.min_vertical)
    }
}
