//! Node update from the assembled residuals.
//!
//! Per node, with lumped mass `M`:
//!
//! 1. Horizontal accelerations `a = R/M` for every active layer, integrated
//!    with the two-level Adams-Bashforth correction
//!    `u += dt · (3·a_new − a_old) / 2` (forward Euler on the first step),
//!    then capped at the shallow-water wave speed and damped by the puddle
//!    factor. Nodes whose velocity the boundary pass imposed keep it.
//! 2. The vertical velocity at the top of each layer, `w_k = Σ_{j ≥ k} R_w,j / M`,
//!    summed upward from the bed.
//! 3. The level tendency `∂η/∂t = −w_surface − infiltration`, integrated with
//!    the same correction unless the level is prescribed.
//!
//! Candidate values go through the divergence check before they are
//! committed. A divergent node is left with the raw candidate values so
//! that the failing snapshot shows them.

use parking_lot::Mutex;

use super::divergence::{Divergence, DivergenceCheck};
use crate::config::{SimulationContext, SolverConfig};
use crate::state::{LayeredState, LayeredStore, Quantity};
use crate::vertical::DepthLevels;
use crate::wetdry::WetDryPolicy;

/// Parameters of one update pass.
pub(crate) struct NodeUpdate<'a> {
    levels: &'a DepthLevels,
    policy: WetDryPolicy,
    check: DivergenceCheck,
    dt: f64,
    g: f64,
    watt: f64,
    infiltration: f64,
    first_step: bool,
}

impl<'a> NodeUpdate<'a> {
    pub(crate) fn new(
        levels: &'a DepthLevels,
        dt: f64,
        config: &SolverConfig,
        ctx: &SimulationContext,
    ) -> Self {
        Self {
            levels,
            policy: WetDryPolicy::new(ctx.watt),
            check: DivergenceCheck::new(config.divergence_threshold),
            dt,
            g: ctx.g,
            watt: ctx.watt,
            infiltration: config.infiltration_rate,
            first_step: ctx.is_first_step(),
        }
    }

    #[inline]
    fn adams_bashforth(&self, new: f64, old: f64) -> f64 {
        if self.first_step {
            new
        } else {
            1.5 * new - 0.5 * old
        }
    }

    /// Update one node in place.
    pub(crate) fn apply(&self, node: usize, s: &mut LayeredState, mass: f64) -> Result<(), Divergence> {
        if !(mass > 0.0) {
            return Ok(());
        }
        let n_layers = s.n_layers();
        let range = s.layer_range();
        let integrate_velocity = !s.has_prescribed_velocity();

        for k in 0..n_layers {
            let active = range.contains(&k);
            let (du, dv) = if active {
                (s.get(k, Quantity::ResidualU) / mass, s.get(k, Quantity::ResidualV) / mass)
            } else {
                (0.0, 0.0)
            };
            if integrate_velocity && active && s.get(k, Quantity::Thickness) > 0.0 {
                let u = s.get(k, Quantity::U) + self.dt * self.adams_bashforth(du, s.get(k, Quantity::DuDt));
                let v = s.get(k, Quantity::V) + self.dt * self.adams_bashforth(dv, s.get(k, Quantity::DvDt));
                let (u, v) = self.policy.froude_cap(u, v, s.total_depth, self.g);
                s.set(k, Quantity::U, u * s.puddle);
                s.set(k, Quantity::V, v * s.puddle);
            }
            s.set(k, Quantity::DuDt, du);
            s.set(k, Quantity::DvDt, dv);
        }

        let mut w = vec![0.0; n_layers];
        let mut acc = 0.0;
        for k in range.clone().rev() {
            acc += s.get(k, Quantity::ResidualW) / mass;
            w[k] = acc;
        }
        let w_surface = w[s.surface_layer];

        let prescribed_level = s.has_prescribed_level();
        let infiltration = if s.is_wet(self.watt) { self.infiltration } else { 0.0 };
        let detadt = -w_surface - infiltration;
        let eta = if prescribed_level {
            s.eta
        } else {
            s.eta + self.dt * self.adams_bashforth(detadt, s.detadt)
        };

        let divergence = self
            .check
            .scan(node, std::iter::once(&eta))
            .or_else(|| self.check.scan(node, s.column(Quantity::U)))
            .or_else(|| self.check.scan(node, s.column(Quantity::V)))
            .or_else(|| self.check.scan(node, &w));
        if let Some(d) = divergence {
            s.eta = eta;
            s.total_depth = s.bottom + eta;
            s.column_mut(Quantity::W).copy_from_slice(&w);
            return Err(d);
        }

        if !prescribed_level {
            s.column_mut(Quantity::W).copy_from_slice(&w);
            s.detadt = detadt;
            s.set_water_level(eta, self.levels, self.watt);
        } else {
            s.update_discharge();
        }

        if s.total_depth <= 0.0 {
            let surface = s.surface_layer;
            s.set(surface, Quantity::W, w_surface.max(0.0));
        }
        Ok(())
    }
}

/// Update every node; returns the divergence on the lowest node, if any.
pub(crate) fn update_nodes(
    store: &LayeredStore,
    mass: &[f64],
    dt: f64,
    config: &SolverConfig,
    ctx: &SimulationContext,
) -> Result<(), Divergence> {
    let update = NodeUpdate::new(store.levels(), dt, config, ctx);
    let first: Mutex<Option<Divergence>> = Mutex::new(None);

    store.for_each_node(|n| {
        let outcome = {
            let mut s = store.lock(n);
            update.apply(n, &mut s, mass[n])
        };
        if let Err(found) = outcome {
            let mut slot = first.lock();
            *slot = Some(DivergenceCheck::merge(*slot, found));
        }
    });

    match first.into_inner() {
        Some(d) => Err(d),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn wet_column() -> (LayeredState, DepthLevels) {
        let levels = DepthLevels::uniform(3, 1.0).unwrap();
        let mut s = LayeredState::new(3, 2.5, 0.01);
        s.set_water_level(0.0, &levels, 0.1);
        s.puddle = 1.0;
        (s, levels)
    }

    fn context(step: u64) -> (SolverConfig, SimulationContext) {
        let config = SolverConfig::default();
        let mut ctx = SimulationContext::new(&config);
        ctx.step = step;
        (config, ctx)
    }

    #[test]
    fn test_first_step_is_forward_euler() {
        let (mut s, levels) = wet_column();
        s.set(1, Quantity::ResidualU, 2.0);
        let (config, ctx) = context(0);
        NodeUpdate::new(&levels, 0.5, &config, &ctx).apply(0, &mut s, 10.0).unwrap();
        assert!((s.get(1, Quantity::U) - 0.1).abs() < TOL);
        assert!((s.get(1, Quantity::DuDt) - 0.2).abs() < TOL);
    }

    #[test]
    fn test_adams_bashforth_uses_previous_tendency() {
        let (mut s, levels) = wet_column();
        s.set(0, Quantity::ResidualU, 2.0);
        s.set(0, Quantity::DuDt, 0.1);
        let (config, ctx) = context(3);
        NodeUpdate::new(&levels, 1.0, &config, &ctx).apply(0, &mut s, 10.0).unwrap();
        // 1.5·0.2 − 0.5·0.1
        assert!((s.get(0, Quantity::U) - 0.25).abs() < TOL);
    }

    #[test]
    fn test_vertical_velocity_summed_from_bed() {
        let (mut s, levels) = wet_column();
        s.set(0, Quantity::ResidualW, 1.0);
        s.set(1, Quantity::ResidualW, 2.0);
        s.set(2, Quantity::ResidualW, 3.0);
        let (config, ctx) = context(0);
        NodeUpdate::new(&levels, 0.01, &config, &ctx).apply(0, &mut s, 100.0).unwrap();
        assert!((s.get(2, Quantity::W) - 0.03).abs() < TOL);
        assert!((s.get(1, Quantity::W) - 0.05).abs() < TOL);
        assert!((s.get(0, Quantity::W) - 0.06).abs() < TOL);
        assert!((s.detadt + 0.06).abs() < TOL);
        assert!((s.eta + 0.0006).abs() < TOL);
    }

    #[test]
    fn test_puddle_damps_velocity() {
        let (mut s, levels) = wet_column();
        s.set(0, Quantity::ResidualU, 10.0);
        s.puddle = 0.5;
        let (config, ctx) = context(0);
        NodeUpdate::new(&levels, 1.0, &config, &ctx).apply(0, &mut s, 10.0).unwrap();
        assert!((s.get(0, Quantity::U) - 0.5).abs() < TOL);
    }

    #[test]
    fn test_froude_cap() {
        let (mut s, levels) = wet_column();
        s.set(0, Quantity::ResidualU, 1.0e4);
        let (config, ctx) = context(0);
        NodeUpdate::new(&levels, 1.0, &config, &ctx).apply(0, &mut s, 1.0).unwrap();
        let limit = (9.81f64 * 2.5).sqrt();
        assert!((s.get(0, Quantity::U) - limit).abs() < 1e-9);
    }

    #[test]
    fn test_divergent_node_keeps_raw_values() {
        let (mut s, levels) = wet_column();
        s.set(0, Quantity::ResidualW, -1.0e9);
        let (config, ctx) = context(0);
        let err = NodeUpdate::new(&levels, 1.0, &config, &ctx)
            .apply(5, &mut s, 1.0)
            .unwrap_err();
        assert_eq!(err.node, 5);
        assert!(err.value > 1.0e5);
        assert_eq!(s.eta, err.value);
    }

    #[test]
    fn test_divergent_vertical_velocity_detected() {
        // Opposite layer fluxes leave the surface still but not the layer below.
        let (mut s, levels) = wet_column();
        s.set(2, Quantity::ResidualW, 1.0e9);
        s.set(1, Quantity::ResidualW, -1.0e9);
        let (config, ctx) = context(0);
        let err = NodeUpdate::new(&levels, 1.0, &config, &ctx)
            .apply(2, &mut s, 1.0)
            .unwrap_err();
        assert_eq!(err.node, 2);
        assert!((err.value - 1.0e9).abs() < 1.0);
        assert_eq!(s.eta, 0.0);
        assert_eq!(s.get(2, Quantity::W), err.value);
    }

    #[test]
    fn test_imposed_velocity_is_kept() {
        let (mut s, levels) = wet_column();
        s.column_mut(Quantity::U).fill(0.3);
        s.set(0, Quantity::ResidualU, 5.0);
        s.velocity_imposed = true;
        let (config, ctx) = context(0);
        NodeUpdate::new(&levels, 1.0, &config, &ctx).apply(0, &mut s, 10.0).unwrap();
        assert_eq!(s.get(0, Quantity::U), 0.3);

        s.velocity_imposed = false;
        NodeUpdate::new(&levels, 1.0, &config, &ctx).apply(0, &mut s, 10.0).unwrap();
        assert!(s.get(0, Quantity::U) > 0.3);
    }

    #[test]
    fn test_dry_node_reports_seepage() {
        let levels = DepthLevels::uniform(3, 1.0).unwrap();
        let mut s = LayeredState::new(3, 0.5, 0.01);
        s.set_water_level(-0.5, &levels, 0.1);
        s.set(s.surface_layer, Quantity::ResidualW, 1.0e-5);
        let (config, ctx) = context(0);
        NodeUpdate::new(&levels, 1.0, &config, &ctx).apply(0, &mut s, 1.0).unwrap();
        assert_eq!(s.total_depth, 0.0);
        assert!((s.get(s.surface_layer, Quantity::W) - 1.0e-5).abs() < TOL);
        assert!(s.column(Quantity::U).iter().all(|&u| u == 0.0));
    }
}
