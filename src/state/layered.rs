//! State of one mesh node: scalars plus a column of per-layer channels.
//!
//! The per-layer channels live in a single contiguous buffer, one block of
//! `n_layers` values per [`Quantity`]. Scalars (water level, depth, wetting
//! factor, bed shear, forcing flags) are plain fields.
//!
//! Invariants maintained by [`LayeredState::set_water_level`]:
//! - `total_depth = bottom + eta` and is never negative; a node forced dry
//!   gets `eta = -bottom`.
//! - `wet_factor = min(1, total_depth / WATT)` lies in `[0, 1]`.
//! - Layers with zero thickness carry no velocity, discharge or coefficient.

use std::ops::RangeInclusive;

use super::quantity::Quantity;
use crate::coupling::SubModelData;
use crate::forcing::BoundaryForcing;
use crate::mesh::WallContact;
use crate::vertical::DepthLevels;

/// Smallest vertical spacing used in finite differences (m).
const MIN_SPACING: f64 = 1.0e-3;

/// Channels zeroed when a layer has no water.
const CLEARED_ON_EMPTY: [Quantity; 14] = [
    Quantity::U,
    Quantity::V,
    Quantity::W,
    Quantity::Qx,
    Quantity::Qy,
    Quantity::DuDt,
    Quantity::DvDt,
    Quantity::DuDz,
    Quantity::DvDz,
    Quantity::D2uDz2,
    Quantity::D2vDz2,
    Quantity::Friction,
    Quantity::WindX,
    Quantity::WindY,
];

/// Full state of one node.
#[derive(Clone, Debug)]
pub struct LayeredState {
    n_layers: usize,
    data: Vec<f64>,
    /// Water level above datum (m, positive up)
    pub eta: f64,
    /// Bed depth below datum (m, positive down)
    pub bottom: f64,
    /// Water depth `bottom + eta`, never negative
    pub total_depth: f64,
    /// `min(1, total_depth / WATT)`
    pub wet_factor: f64,
    /// First layer holding water (or the bed layer when dry)
    pub surface_layer: usize,
    /// Last layer holding water (or the layer containing the bed when dry)
    pub bed_layer: usize,
    /// Previous surface tendency dη/dt (Adams-Bashforth history)
    pub detadt: f64,
    /// Depth-integrated discharge (m²/s)
    pub discharge: (f64, f64),
    /// Kinematic bed shear stress (τx, τy, |τ|) in m²/s²
    pub bed_shear: [f64; 3],
    /// Largest wetting factor of any neighbour, rebuilt every step
    pub puddle: f64,
    /// Whether assembly may inject seepage at this node
    pub seepage: bool,
    /// Bed roughness in the units of the configured friction law
    pub roughness: f64,
    /// Contact with the closed boundary
    pub wall: Option<WallContact>,
    /// Boundary forcing attached to this node
    pub forcing: Option<BoundaryForcing>,
    /// Velocity imposed by the boundary pass of the current step
    pub velocity_imposed: bool,
    /// Relax the level toward wet neighbours each step
    pub extrapolate_level: bool,
    /// Relax the velocity toward wet neighbours each step
    pub extrapolate_velocity: bool,
    /// Latest wind and wave data from the coupled sub-models
    pub sub_models: SubModelData,
}

impl LayeredState {
    /// Still, dry node with the given bed depth and roughness.
    pub fn new(n_layers: usize, bottom: f64, roughness: f64) -> Self {
        Self {
            n_layers,
            data: vec![0.0; n_layers * Quantity::ALL.len()],
            eta: -bottom,
            bottom,
            total_depth: 0.0,
            wet_factor: 0.0,
            surface_layer: 0,
            bed_layer: 0,
            detadt: 0.0,
            discharge: (0.0, 0.0),
            bed_shear: [0.0; 3],
            puddle: 0.0,
            seepage: true,
            roughness,
            wall: None,
            forcing: None,
            velocity_imposed: false,
            extrapolate_level: false,
            extrapolate_velocity: false,
            sub_models: SubModelData::default(),
        }
    }

    /// Number of layers.
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    #[inline]
    fn offset(&self, q: Quantity) -> usize {
        q as usize * self.n_layers
    }

    /// All layer values of one channel.
    #[inline]
    pub fn column(&self, q: Quantity) -> &[f64] {
        let start = self.offset(q);
        &self.data[start..start + self.n_layers]
    }

    /// Mutable layer values of one channel.
    #[inline]
    pub fn column_mut(&mut self, q: Quantity) -> &mut [f64] {
        let start = self.offset(q);
        let n = self.n_layers;
        &mut self.data[start..start + n]
    }

    /// Two distinct channels mutably at once, returned in argument order.
    ///
    /// # Panics
    /// If `a == b`.
    pub fn columns_mut(&mut self, a: Quantity, b: Quantity) -> (&mut [f64], &mut [f64]) {
        assert_ne!(a, b, "cannot borrow one channel twice");
        let n = self.n_layers;
        let (lo, hi, swapped) = if (a as usize) < (b as usize) {
            (a, b, false)
        } else {
            (b, a, true)
        };
        let split = self.offset(hi);
        let (head, tail) = self.data.split_at_mut(split);
        let lo_start = lo as usize * n;
        let first = &mut head[lo_start..lo_start + n];
        let second = &mut tail[..n];
        if swapped { (second, first) } else { (first, second) }
    }

    /// Value of channel `q` in layer `k`.
    #[inline]
    pub fn get(&self, k: usize, q: Quantity) -> f64 {
        self.data[self.offset(q) + k]
    }

    /// Set channel `q` in layer `k`.
    #[inline]
    pub fn set(&mut self, k: usize, q: Quantity, value: f64) {
        let i = self.offset(q) + k;
        self.data[i] = value;
    }

    /// Layers from the surface layer down to the bed layer.
    #[inline]
    pub fn layer_range(&self) -> RangeInclusive<usize> {
        self.surface_layer..=self.bed_layer
    }

    /// True when the depth reaches the wetting threshold.
    #[inline]
    pub fn is_wet(&self, watt: f64) -> bool {
        self.total_depth >= watt
    }

    /// `1 - wet_factor`.
    #[inline]
    pub fn dry_factor(&self) -> f64 {
        1.0 - self.wet_factor
    }

    /// True when a boundary forcing prescribes the water level.
    pub fn has_prescribed_level(&self) -> bool {
        self.forcing.as_ref().is_some_and(BoundaryForcing::prescribes_level)
    }

    /// True when the boundary pass imposed a velocity during this step.
    ///
    /// A velocity-type forcing that could not be applied (a flow rate on a
    /// node below the wetting threshold, a controlled discharge without a
    /// controller) does not count.
    #[inline]
    pub fn has_prescribed_velocity(&self) -> bool {
        self.velocity_imposed
    }

    /// Set the water level and recompute depth, wetting and layer thickness.
    ///
    /// A level at or below the bed forces the node dry with `eta = -bottom`.
    /// Calling this twice with the same level is idempotent.
    pub fn set_water_level(&mut self, eta: f64, levels: &DepthLevels, watt: f64) {
        let depth = self.bottom + eta;
        if depth > 0.0 {
            self.eta = eta;
            self.total_depth = depth;
        } else {
            self.eta = -self.bottom;
            self.total_depth = 0.0;
        }
        self.wet_factor = (self.total_depth / watt).min(1.0);
        (self.surface_layer, self.bed_layer) = levels.active_range(self.eta, self.bottom);

        for k in 0..self.n_layers {
            let d = levels.thickness(k, self.eta, self.bottom);
            self.set(k, Quantity::Thickness, d);
            if d <= 0.0 {
                for q in CLEARED_ON_EMPTY {
                    self.set(k, q, 0.0);
                }
            }
        }
        self.update_discharge();
    }

    /// Move the bed and recompute the column.
    ///
    /// A wet node keeps its water level; a dry node stays dry on the new bed.
    pub fn set_bottom_level(&mut self, bottom: f64, levels: &DepthLevels, watt: f64) {
        let was_dry = self.total_depth <= 0.0;
        self.bottom = bottom;
        let eta = if was_dry { -bottom } else { self.eta };
        self.set_water_level(eta, levels, watt);
    }

    /// Clear residual channels and the per-step wetting flags.
    pub fn reset_step(&mut self) {
        for q in [Quantity::ResidualU, Quantity::ResidualV, Quantity::ResidualW] {
            self.column_mut(q).fill(0.0);
        }
        self.puddle = 0.0;
        self.seepage = true;
        self.velocity_imposed = false;
    }

    /// Recompute layer discharges `q = u·d` and their vertical sums.
    pub fn update_discharge(&mut self) {
        let mut qx_total = 0.0;
        let mut qy_total = 0.0;
        for k in 0..self.n_layers {
            let d = self.get(k, Quantity::Thickness);
            let qx = self.get(k, Quantity::U) * d;
            let qy = self.get(k, Quantity::V) * d;
            self.set(k, Quantity::Qx, qx);
            self.set(k, Quantity::Qy, qy);
            qx_total += qx;
            qy_total += qy;
        }
        self.discharge = (qx_total, qy_total);
    }

    /// Depth-averaged horizontal velocity.
    pub fn depth_mean_velocity(&self) -> (f64, f64) {
        if self.total_depth <= 0.0 {
            return (0.0, 0.0);
        }
        let mut u = 0.0;
        let mut v = 0.0;
        for k in self.layer_range() {
            let d = self.get(k, Quantity::Thickness);
            u += self.get(k, Quantity::U) * d;
            v += self.get(k, Quantity::V) * d;
        }
        (u / self.total_depth, v / self.total_depth)
    }

    /// Mean velocity over the lowest `band` metres of the water column.
    pub fn near_bed_velocity(&self, band: f64, levels: &DepthLevels) -> (f64, f64) {
        let band = band.min(self.total_depth);
        if band <= 0.0 {
            return (0.0, 0.0);
        }
        let band_top = self.bottom - band;
        let mut u = 0.0;
        let mut v = 0.0;
        for k in self.layer_range().rev() {
            let top = levels.layer_top(k, self.eta);
            let bottom = top + self.get(k, Quantity::Thickness);
            let overlap = bottom - top.max(band_top);
            if overlap <= 0.0 {
                break;
            }
            u += self.get(k, Quantity::U) * overlap;
            v += self.get(k, Quantity::V) * overlap;
        }
        (u / band, v / band)
    }

    /// Depth of the centre of every layer.
    fn layer_centres(&self, levels: &DepthLevels) -> Vec<f64> {
        (0..self.n_layers)
            .map(|k| levels.layer_centre(k, self.eta, self.bottom))
            .collect()
    }

    /// Gradient of channel `q` across the interface below layer `k`.
    fn interface_gradient(&self, k: usize, q: Quantity, centres: &[f64]) -> f64 {
        let dz = (centres[k + 1] - centres[k]).max(MIN_SPACING);
        (self.get(k + 1, q) - self.get(k, q)) / dz
    }

    /// Forward difference ∂q/∂z between layer `k` and the layer below.
    ///
    /// Zero at the bed layer and outside the water column.
    pub fn forward_difference(&self, k: usize, q: Quantity, levels: &DepthLevels) -> f64 {
        if !self.layer_range().contains(&k) || k == self.bed_layer {
            return 0.0;
        }
        self.interface_gradient(k, q, &self.layer_centres(levels))
    }

    /// Backward difference ∂q/∂z between layer `k` and the layer above.
    ///
    /// Zero at the surface layer and outside the water column.
    pub fn backward_difference(&self, k: usize, q: Quantity, levels: &DepthLevels) -> f64 {
        if !self.layer_range().contains(&k) || k == self.surface_layer {
            return 0.0;
        }
        self.interface_gradient(k - 1, q, &self.layer_centres(levels))
    }

    /// Centred difference ∂q/∂z at layer `k`, one-sided at the ends.
    pub fn centered_difference(&self, k: usize, q: Quantity, levels: &DepthLevels) -> f64 {
        if !self.layer_range().contains(&k) || self.surface_layer == self.bed_layer {
            return 0.0;
        }
        let centres = self.layer_centres(levels);
        if k == self.surface_layer {
            self.interface_gradient(k, q, &centres)
        } else if k == self.bed_layer {
            self.interface_gradient(k - 1, q, &centres)
        } else {
            let dz = (centres[k + 1] - centres[k - 1]).max(MIN_SPACING);
            (self.get(k + 1, q) - self.get(k - 1, q)) / dz
        }
    }

    /// Refresh ∂u/∂z, ∂v/∂z and the second derivatives of every wet layer.
    ///
    /// Second derivatives are conservative: the difference of the interface
    /// gradients divided by the layer thickness, with zero gradient at the
    /// surface and the bed (stresses enter there as separate terms).
    pub fn update_vertical_shear(&mut self, levels: &DepthLevels) {
        for q in [Quantity::DuDz, Quantity::DvDz, Quantity::D2uDz2, Quantity::D2vDz2] {
            self.column_mut(q).fill(0.0);
        }
        if self.total_depth <= 0.0 || self.surface_layer == self.bed_layer {
            return;
        }
        let centres = self.layer_centres(levels);
        for (value, first, second) in [
            (Quantity::U, Quantity::DuDz, Quantity::D2uDz2),
            (Quantity::V, Quantity::DvDz, Quantity::D2vDz2),
        ] {
            for k in self.layer_range() {
                let above = if k > self.surface_layer {
                    Some(self.interface_gradient(k - 1, value, &centres))
                } else {
                    None
                };
                let below = if k < self.bed_layer {
                    Some(self.interface_gradient(k, value, &centres))
                } else {
                    None
                };
                let slope = match (above, below) {
                    (Some(a), Some(b)) => 0.5 * (a + b),
                    (Some(g), None) | (None, Some(g)) => g,
                    (None, None) => 0.0,
                };
                let d = self.get(k, Quantity::Thickness).max(MIN_SPACING);
                let curvature = (below.unwrap_or(0.0) - above.unwrap_or(0.0)) / d;
                self.set(k, first, slope);
                self.set(k, second, curvature);
            }
        }
    }

    /// Smallest value of channel `q` over all layers.
    pub fn min_over_layers(&self, q: Quantity) -> f64 {
        self.column(q).iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest value of channel `q` over all layers.
    pub fn max_over_layers(&self, q: Quantity) -> f64 {
        self.column(q).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Value of channel `q` at a fractional layer position.
    ///
    /// Position `k + f` interpolates linearly between layers `k` and `k + 1`;
    /// positions outside `[0, n_layers - 1]` are clamped.
    pub fn value_at(&self, position: f64, q: Quantity) -> f64 {
        let last = (self.n_layers - 1) as f64;
        let p = if position.is_nan() { 0.0 } else { position.clamp(0.0, last) };
        let k = p.floor() as usize;
        let frac = p - k as f64;
        let column = self.column(q);
        match column.get(k + 1) {
            Some(&next) if frac > 0.0 => column[k] + frac * (next - column[k]),
            _ => column[k],
        }
    }
}
