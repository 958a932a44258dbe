//! Per-step boundary-condition pass.
//!
//! Runs before assembly in three phases:
//!
//! 1. **Reset and force** (parallel): clear residual channels and wetting
//!    flags, pull bed depths and sub-model data from the collaborators, and
//!    impose prescribed levels together with the matching vertical-velocity
//!    profile `w(z) = -dη/dt · (height above bed) / H`.
//! 2. **Extrapolate** (sequential, ascending node order): nodes flagged for
//!    extrapolation relax their level and velocity toward wet neighbours;
//!    marginally dry nodes relax toward their lowest neighbour. Neighbours
//!    are read one lock at a time, never while holding the node's own lock.
//! 3. **Resolve** (parallel): seepage eligibility, controlled discharges,
//!    prescribed velocities and flow rates, wall slip (no flow at corners),
//!    friction and wind coefficients, bed shear and vertical shear.
//!
//! Only phase 2 writes levels of other nodes' neighbours, so phase 3 can read
//! neighbour levels concurrently without ordering effects.

use crate::config::{SimulationContext, SolverConfig};
use crate::coupling::{BathymetrySource, Collaborators, MeteorologySource, WaveSource};
use crate::forcing::{BoundaryForcing, DischargeController};
use crate::mesh::WallContact;
use crate::source::{BedFriction, NEAR_BED_BAND, WindStress};
use crate::state::{LayeredState, LayeredStore, Quantity};
use crate::vertical::DepthLevels;
use crate::wetdry::WetDryPolicy;

/// Everything the boundary pass reads, borrowed for one step.
pub(crate) struct BoundaryPass<'a> {
    store: &'a LayeredStore,
    neighbours: &'a [Vec<usize>],
    config: &'a SolverConfig,
    ctx: &'a SimulationContext,
    policy: WetDryPolicy,
    friction: BedFriction,
    wind: WindStress,
    bathymetry: Option<&'a dyn BathymetrySource>,
    meteorology: Option<&'a dyn MeteorologySource>,
    waves: Option<&'a dyn WaveSource>,
    controller: Option<&'a dyn DischargeController>,
}

/// Neighbour values read during extrapolation.
struct NeighbourSample {
    eta: f64,
    depth: f64,
    extrapolated: bool,
    u: Vec<f64>,
    v: Vec<f64>,
    thickness: Vec<f64>,
}

impl<'a> BoundaryPass<'a> {
    pub(crate) fn new(
        store: &'a LayeredStore,
        neighbours: &'a [Vec<usize>],
        config: &'a SolverConfig,
        ctx: &'a SimulationContext,
        collaborators: &'a Collaborators,
    ) -> Self {
        Self {
            store,
            neighbours,
            config,
            ctx,
            policy: WetDryPolicy::new(ctx.watt),
            friction: BedFriction::new(config.friction, ctx.g, ctx.watt, config.default_roughness),
            wind: WindStress::new(config.drag, config.rho_air, config.rho_water, ctx.watt),
            bathymetry: collaborators.bathymetry.as_deref(),
            meteorology: collaborators.meteorology.as_deref(),
            waves: collaborators.waves.as_deref(),
            controller: collaborators.discharge.as_deref(),
        }
    }

    fn levels(&self) -> &DepthLevels {
        self.store.levels()
    }

    // =========================================================================
    // Phase 1: reset and force
    // =========================================================================

    /// Reset per-step channels, refresh collaborator data, impose levels.
    pub(crate) fn reset_and_force(&self) {
        self.store.for_each_node(|n| self.reset_node(n));
    }

    fn reset_node(&self, n: usize) {
        let t = self.ctx.time;
        let watt = self.ctx.watt;
        let levels = self.levels();
        let mut s = self.store.lock(n);
        s.reset_step();

        if let Some(source) = self.bathymetry
            && let Some(bottom) = source.bottom(n, t)
        {
            if bottom.is_finite() {
                if bottom != s.bottom {
                    s.set_bottom_level(bottom, levels, watt);
                }
            } else {
                log::warn!("bathymetry source returned {bottom} for node {n}, keeping {}", s.bottom);
            }
        }

        s.sub_models.wind = self.meteorology.and_then(|m| m.wind(n, t));
        s.sub_models.wave = self.waves.and_then(|w| w.wave(n, t));

        if let Some(level) = s.forcing.as_ref().and_then(|f| f.level_at(t)) {
            s.set_water_level(level.value, levels, watt);
            impose_level_profile(&mut s, level.derivative, levels);
        }
    }

    // =========================================================================
    // Phase 2: extrapolation
    // =========================================================================

    /// Relax flagged nodes toward their neighbours, in node order.
    pub(crate) fn extrapolate(&self) {
        for n in 0..self.store.n_nodes() {
            let (extrapolate_level, extrapolate_velocity, eta, depth) = {
                let s = self.store.lock(n);
                (s.extrapolate_level, s.extrapolate_velocity, s.eta, s.total_depth)
            };
            if !(extrapolate_level || extrapolate_velocity) {
                continue;
            }

            let samples: Vec<NeighbourSample> = self.neighbours[n]
                .iter()
                .map(|&m| {
                    let s = self.store.lock(m);
                    NeighbourSample {
                        eta: s.eta,
                        depth: s.total_depth,
                        extrapolated: s.extrapolate_level || s.extrapolate_velocity,
                        u: s.column(Quantity::U).to_vec(),
                        v: s.column(Quantity::V).to_vec(),
                        thickness: s.column(Quantity::Thickness).to_vec(),
                    }
                })
                .collect();

            if !self.policy.is_dry(depth) {
                self.relax_wet_node(n, &samples, extrapolate_level, extrapolate_velocity);
            } else if extrapolate_level {
                self.relax_dry_node(n, eta, &samples);
            }
        }
    }

    fn relax_wet_node(
        &self,
        n: usize,
        samples: &[NeighbourSample],
        extrapolate_level: bool,
        extrapolate_velocity: bool,
    ) {
        let levels = self.levels();
        let mut s = self.store.lock(n);
        let mut eta = s.eta;
        let mut u = s.column(Quantity::U).to_vec();
        let mut v = s.column(Quantity::V).to_vec();
        let own_thickness = s.column(Quantity::Thickness).to_vec();

        for nb in samples.iter().filter(|nb| !self.policy.is_dry(nb.depth)) {
            let alpha = if nb.extrapolated {
                self.config.extrapolation_relaxation
            } else {
                self.config.free_neighbour_relaxation
            };
            if extrapolate_level {
                eta += alpha * (nb.eta - eta);
            }
            if extrapolate_velocity {
                for k in 0..u.len() {
                    if own_thickness[k] > 0.0 && nb.thickness[k] > 0.0 {
                        u[k] += alpha * (nb.u[k] - u[k]);
                        v[k] += alpha * (nb.v[k] - v[k]);
                    }
                }
            }
        }

        if extrapolate_level && !s.has_prescribed_level() {
            s.set_water_level(eta, levels, self.ctx.watt);
        }
        if extrapolate_velocity && !s.has_prescribed_velocity() {
            for k in s.layer_range() {
                if s.get(k, Quantity::Thickness) > 0.0 {
                    s.set(k, Quantity::U, u[k]);
                    s.set(k, Quantity::V, v[k]);
                }
            }
            s.update_discharge();
        }
    }

    fn relax_dry_node(&self, n: usize, eta: f64, samples: &[NeighbourSample]) {
        let lowest = samples.iter().map(|nb| nb.eta).fold(f64::INFINITY, f64::min);
        if !lowest.is_finite() {
            return;
        }
        let mut s = self.store.lock(n);
        if s.has_prescribed_level() {
            return;
        }
        let relaxed = eta + self.config.dry_relaxation * (lowest - eta);
        s.set_water_level(relaxed, self.levels(), self.ctx.watt);
    }

    // =========================================================================
    // Phase 3: resolve
    // =========================================================================

    /// Seepage flags, velocity forcing, wall slip and coefficients.
    pub(crate) fn resolve(&self) {
        self.store.for_each_node(|n| self.resolve_node(n));
    }

    fn resolve_node(&self, n: usize) {
        let t = self.ctx.time;
        let watt = self.ctx.watt;
        let levels = self.levels();

        let (eta, depth) = {
            let s = self.store.lock(n);
            (s.eta, s.total_depth)
        };
        let seepage = if self.policy.is_dry(depth) {
            let around: Vec<(f64, f64)> = self.neighbours[n]
                .iter()
                .map(|&m| {
                    let s = self.store.lock(m);
                    (s.eta, s.total_depth)
                })
                .collect();
            self.policy.seepage_allowed(eta, depth, around)
        } else {
            true
        };
        let controlled = self.controller.and_then(|c| c.discharge(n));

        let mut s = self.store.lock(n);
        s.seepage = seepage;

        let prescribed = match &s.forcing {
            Some(BoundaryForcing::ControlledDischarge) => {
                let depth = s.total_depth.max(watt);
                controlled.map(|(qx, qy)| (qx / depth, qy / depth))
            }
            Some(BoundaryForcing::Velocity { u, v }) => {
                Some((u.evaluate(t).value, v.evaluate(t).value))
            }
            Some(BoundaryForcing::FlowRate {
                discharge,
                width,
                direction,
            }) if s.total_depth > watt && *width > 0.0 => {
                let speed = discharge.evaluate(t).value / (width * s.total_depth);
                Some((speed * direction.0, speed * direction.1))
            }
            _ => None,
        };
        if let Some((u, v)) = prescribed {
            set_uniform_velocity(&mut s, u, v);
            s.velocity_imposed = true;
        }

        if !s.has_prescribed_velocity() {
            match s.wall {
                Some(WallContact::Slip(nx, ny)) => remove_normal_velocity(&mut s, nx, ny),
                Some(WallContact::Corner) => set_uniform_velocity(&mut s, 0.0, 0.0),
                None => {}
            }
        }

        self.update_coefficients(&mut s);

        let mean = s.depth_mean_velocity();
        let near_bed = s.near_bed_velocity(NEAR_BED_BAND, levels);
        s.bed_shear = self.friction.bed_shear(s.roughness, s.total_depth, mean, near_bed);
        s.update_vertical_shear(levels);
        s.update_discharge();
    }

    fn update_coefficients(&self, s: &mut LayeredState) {
        s.column_mut(Quantity::Friction).fill(0.0);
        s.column_mut(Quantity::WindX).fill(0.0);
        s.column_mut(Quantity::WindY).fill(0.0);
        if !s.is_wet(self.ctx.watt) {
            return;
        }

        let bed = s.bed_layer;
        let height = 0.5 * s.get(bed, Quantity::Thickness);
        let cf = self.friction.coefficient(s.roughness, s.total_depth, height);
        s.set(bed, Quantity::Friction, cf);

        if let Some(wind) = s.sub_models.wind {
            let (tx, ty) = self.wind.kinematic_stress(&wind, s.total_depth);
            let surface = s.surface_layer;
            s.set(surface, Quantity::WindX, tx);
            s.set(surface, Quantity::WindY, ty);
        }
    }
}

/// Vertical velocity consistent with a prescribed level rate.
///
/// The layer-top velocity decreases linearly from `-dη/dt` at the surface to
/// zero at the bed, which is what a uniformly stretching column produces.
fn impose_level_profile(s: &mut LayeredState, detadt: f64, levels: &DepthLevels) {
    s.detadt = detadt;
    if s.total_depth <= 0.0 {
        return;
    }
    for k in s.layer_range() {
        let height = s.bottom - levels.layer_top(k, s.eta);
        let w = -detadt * height / s.total_depth;
        s.set(k, Quantity::W, w);
    }
}

fn set_uniform_velocity(s: &mut LayeredState, u: f64, v: f64) {
    for k in s.layer_range() {
        if s.get(k, Quantity::Thickness) > 0.0 {
            s.set(k, Quantity::U, u);
            s.set(k, Quantity::V, v);
        }
    }
}

fn remove_normal_velocity(s: &mut LayeredState, nx: f64, ny: f64) {
    let (u, v) = s.columns_mut(Quantity::U, Quantity::V);
    for (uk, vk) in u.iter_mut().zip(v.iter_mut()) {
        let normal = *uk * nx + *vk * ny;
        *uk -= normal * nx;
        *vk -= normal * ny;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn column(bottom: f64, eta: f64) -> (LayeredState, DepthLevels) {
        let levels = DepthLevels::uniform(4, 1.0).unwrap();
        let mut s = LayeredState::new(4, bottom, 0.01);
        s.set_water_level(eta, &levels, 0.1);
        (s, levels)
    }

    #[test]
    fn test_level_profile_linear_in_height() {
        let (mut s, levels) = column(4.0, 0.0);
        impose_level_profile(&mut s, 2.0e-4, &levels);
        assert!((s.get(0, Quantity::W) + 2.0e-4).abs() < TOL);
        assert!((s.get(2, Quantity::W) + 1.0e-4).abs() < TOL);
        assert!((s.detadt - 2.0e-4).abs() < TOL);
    }

    #[test]
    fn test_wall_slip_removes_normal_component() {
        let (mut s, _) = column(2.0, 0.0);
        set_uniform_velocity(&mut s, 0.3, 0.4);
        remove_normal_velocity(&mut s, 0.0, 1.0);
        assert!((s.get(0, Quantity::U) - 0.3).abs() < TOL);
        assert!(s.get(0, Quantity::V).abs() < TOL);
        assert_eq!(s.get(3, Quantity::U), 0.0);
    }
}
