//! Spatial profiles along open boundaries.
//!
//! A boundary forced with one time function often needs a different offset
//! at each node: a tidal level that tilts across an estuary mouth, or a set
//! of gauge offsets. [`SpatialProfile`] maps a node position to that offset.

use crate::error::{Result, SolverError};

/// Inverse-distance weighting exponent.
const IDW_POWER: i32 = 2;

/// A scalar field over the horizontal plane.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpatialProfile {
    /// The same value everywhere.
    Uniform(f64),
    /// `value + gx·(x - x0) + gy·(y - y0)`
    Plane {
        /// Value at the reference point
        value: f64,
        /// Reference point
        origin: (f64, f64),
        /// Gradient (per metre)
        gradient: (f64, f64),
    },
    /// Inverse-distance interpolation of scattered samples `(x, y, value)`.
    Points(Vec<(f64, f64, f64)>),
}

impl SpatialProfile {
    /// Scattered-sample profile.
    ///
    /// # Errors
    /// [`SolverError::InvalidForcing`] when no samples are given.
    pub fn points(samples: Vec<(f64, f64, f64)>) -> Result<Self> {
        if samples.is_empty() {
            return Err(SolverError::InvalidForcing(
                "spatial profile needs at least one sample".into(),
            ));
        }
        Ok(SpatialProfile::Points(samples))
    }

    /// Value at position (x, y).
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        match self {
            SpatialProfile::Uniform(v) => *v,
            SpatialProfile::Plane {
                value,
                origin,
                gradient,
            } => value + gradient.0 * (x - origin.0) + gradient.1 * (y - origin.1),
            SpatialProfile::Points(samples) => {
                let mut weight_sum = 0.0;
                let mut value_sum = 0.0;
                for &(px, py, v) in samples {
                    let d2 = (x - px).powi(2) + (y - py).powi(2);
                    if d2 < 1.0e-18 {
                        return v;
                    }
                    let w = 1.0 / d2.sqrt().powi(IDW_POWER);
                    weight_sum += w;
                    value_sum += w * v;
                }
                if weight_sum > 0.0 { value_sum / weight_sum } else { 0.0 }
            }
        }
    }
}
