//! Wave radiation stress.
//!
//! Breaking waves transfer momentum to the mean flow through the divergence
//! of the radiation stress tensor. Divided by depth, the acceleration
//!
//! ```text
//! a = -(1/H) ∇·S
//! ```
//!
//! is applied uniformly over the water column. Where the water is shallower
//! than twice the wave amplitude the stress is tapered by `H / 2a`, which
//! keeps the swash zone from being driven by stresses the wave model computed
//! for deeper water.

use crate::coupling::WaveData;
use crate::mesh::ElementGeometry;

/// Element-averaged radiation-stress acceleration (m/s²).
///
/// # Arguments
/// * `geometry` - Triangle geometry
/// * `waves` - Wave data at the three nodes
/// * `depth` - Element-mean water depth (m)
/// * `watt` - Wetting threshold (m), lower bound for the depth divisor
pub fn radiation_acceleration(
    geometry: &ElementGeometry,
    waves: [WaveData; 3],
    depth: f64,
    watt: f64,
) -> (f64, f64) {
    let (dsxx_dx, _) = geometry.gradient(waves.map(|w| w.sxx));
    let (dsxy_dx, dsxy_dy) = geometry.gradient(waves.map(|w| w.sxy));
    let (_, dsyy_dy) = geometry.gradient(waves.map(|w| w.syy));

    let amplitude = waves.iter().map(|w| w.amplitude).sum::<f64>() / 3.0;
    let taper = if amplitude > 0.0 {
        (depth / (2.0 * amplitude)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let scale = -taper / depth.max(watt);
    (scale * (dsxx_dx + dsxy_dy), scale * (dsxy_dx + dsyy_dy))
}
