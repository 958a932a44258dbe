//! Fixed depth levels (z-levels) shared by every node of the mesh.
//!
//! Levels are depths below datum, positive downward and strictly
//! increasing. Layer `k` nominally spans `[level_k, level_{k+1}]`; the first
//! layer reaches up to the free surface and the last one down to the bed:
//!
//! ```text
//!   -η ─────────────── free surface (may cut through any layer)
//!        layer 0
//!   level_1 ──────────
//!        layer 1
//!   level_2 ──────────
//!        ...
//!   bottom ─────────── bed (may cut through any layer)
//! ```
//!
//! The thickness of layer `k` at a node with level η and bed depth `z_b` is
//!
//! ```text
//! d_k = clamp(min(level_{k+1}, z_b) - max(level_k, -η), 0, z_b - max(level_k, -η))
//! ```
//!
//! so layers above the surface or below the bed have zero thickness and the
//! thicknesses always sum to the total depth `z_b + η`.

use crate::error::{Result, SolverError};

/// Mesh-wide sequence of layer-top depths.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepthLevels {
    depths: Vec<f64>,
}

impl DepthLevels {
    /// Build from layer-top depths.
    ///
    /// # Errors
    /// [`SolverError::InvalidLevels`] if the sequence is empty, contains
    /// non-finite values or is not strictly increasing.
    pub fn new(depths: Vec<f64>) -> Result<Self> {
        if depths.is_empty() {
            return Err(SolverError::InvalidLevels("no depth levels given".into()));
        }
        if let Some(bad) = depths.iter().find(|d| !d.is_finite()) {
            return Err(SolverError::InvalidLevels(format!("non-finite level {bad}")));
        }
        if let Some(w) = depths.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SolverError::InvalidLevels(format!(
                "levels must increase strictly, found {} after {}",
                w[1], w[0]
            )));
        }
        Ok(Self { depths })
    }

    /// `n_layers` layers of equal nominal thickness starting at datum.
    pub fn uniform(n_layers: usize, thickness: f64) -> Result<Self> {
        if !(thickness > 0.0) {
            return Err(SolverError::InvalidLevels(format!(
                "layer thickness must be positive, got {thickness}"
            )));
        }
        Self::new((0..n_layers).map(|k| k as f64 * thickness).collect())
    }

    /// Single layer spanning the whole water column.
    pub fn single() -> Self {
        Self { depths: vec![0.0] }
    }

    /// Number of layers.
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.depths.len()
    }

    /// Nominal layer-top depths.
    #[inline]
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// Depth of the upper boundary of layer `k`, cut by the free surface.
    #[inline]
    pub fn layer_top(&self, k: usize, eta: f64) -> f64 {
        if k == 0 { -eta } else { self.depths[k].max(-eta) }
    }

    /// Depth of the lower boundary of layer `k`, cut by the bed.
    #[inline]
    pub fn layer_bottom(&self, k: usize, bottom: f64) -> f64 {
        match self.depths.get(k + 1) {
            Some(&next) => next.min(bottom),
            None => bottom,
        }
    }

    /// Thickness of layer `k` for water level `eta` and bed depth `bottom`.
    #[inline]
    pub fn thickness(&self, k: usize, eta: f64, bottom: f64) -> f64 {
        let top = self.layer_top(k, eta);
        let cap = (bottom - top).max(0.0);
        (self.layer_bottom(k, bottom) - top).clamp(0.0, cap)
    }

    /// Fill `out` with the thickness of every layer.
    pub fn thicknesses_into(&self, eta: f64, bottom: f64, out: &mut [f64]) {
        for (k, d) in out.iter_mut().enumerate().take(self.n_layers()) {
            *d = self.thickness(k, eta, bottom);
        }
    }

    /// Depth of the midpoint of layer `k` between surface and bed cuts.
    #[inline]
    pub fn layer_centre(&self, k: usize, eta: f64, bottom: f64) -> f64 {
        let top = self.layer_top(k, eta);
        0.5 * (top + top + self.thickness(k, eta, bottom))
    }

    /// Index of the layer whose nominal span contains depth `z`.
    ///
    /// Depths above the first level map to layer 0, depths below the last
    /// level to the last layer.
    pub fn layer_containing(&self, z: f64) -> usize {
        self.depths.partition_point(|&d| d <= z).saturating_sub(1)
    }

    /// Surface and bed layer of a node, `(surface, bed)`.
    ///
    /// For a wet node these are the first and last layers with positive
    /// thickness. For a dry node both equal the layer containing the bed.
    pub fn active_range(&self, eta: f64, bottom: f64) -> (usize, usize) {
        let bed = self.depths.partition_point(|&d| d < bottom).saturating_sub(1);
        let surface = self.layer_containing(-eta).min(bed);
        (surface, bed)
    }
}
