//! Single-element kernel: gather, compute, scatter.

use crate::config::{SimulationContext, SolverConfig};
use crate::coupling::WaveData;
use crate::mesh::ElementGeometry;
use crate::source::{TurbulenceClosure, radiation_acceleration};
use crate::state::{LayeredState, LayeredStore, Quantity};
use crate::vertical::DepthLevels;
use crate::wetdry::WetDryPolicy;

/// Copy of everything the element kernel reads from one node.
#[derive(Clone, Debug)]
pub(crate) struct NodeSample {
    pub eta: f64,
    pub bottom: f64,
    pub depth: f64,
    pub wet: f64,
    pub detadt: f64,
    pub seepage: bool,
    pub surface: usize,
    pub bed: usize,
    /// Bed shear velocity u* = √|τ_b|
    pub shear_velocity: f64,
    pub wave: Option<WaveData>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub w: Vec<f64>,
    pub d: Vec<f64>,
    pub dudz: Vec<f64>,
    pub dvdz: Vec<f64>,
    pub d2u: Vec<f64>,
    pub d2v: Vec<f64>,
    pub friction: Vec<f64>,
    pub wind_x: Vec<f64>,
    pub wind_y: Vec<f64>,
    /// Height of each layer centre above the bed
    pub height: Vec<f64>,
}

impl NodeSample {
    pub(crate) fn gather(s: &LayeredState, levels: &DepthLevels) -> Self {
        let height = (0..s.n_layers())
            .map(|k| s.bottom - levels.layer_centre(k, s.eta, s.bottom))
            .collect();
        Self {
            eta: s.eta,
            bottom: s.bottom,
            depth: s.total_depth,
            wet: s.wet_factor,
            detadt: s.detadt,
            seepage: s.seepage,
            surface: s.surface_layer,
            bed: s.bed_layer,
            shear_velocity: s.bed_shear[2].abs().sqrt(),
            wave: s.sub_models.wave,
            u: s.column(Quantity::U).to_vec(),
            v: s.column(Quantity::V).to_vec(),
            w: s.column(Quantity::W).to_vec(),
            d: s.column(Quantity::Thickness).to_vec(),
            dudz: s.column(Quantity::DuDz).to_vec(),
            dvdz: s.column(Quantity::DvDz).to_vec(),
            d2u: s.column(Quantity::D2uDz2).to_vec(),
            d2v: s.column(Quantity::D2vDz2).to_vec(),
            friction: s.column(Quantity::Friction).to_vec(),
            wind_x: s.column(Quantity::WindX).to_vec(),
            wind_y: s.column(Quantity::WindY).to_vec(),
            height,
        }
    }
}

/// Residual increments of one element for its three nodes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ElementContribution {
    pub nodes: [usize; 3],
    pub residual_u: [Vec<f64>; 3],
    pub residual_v: [Vec<f64>; 3],
    pub residual_w: [Vec<f64>; 3],
    pub puddle: [f64; 3],
}

impl ElementContribution {
    fn new(nodes: [usize; 3], n_layers: usize) -> Self {
        let zeros = || [vec![0.0; n_layers], vec![0.0; n_layers], vec![0.0; n_layers]];
        Self {
            nodes,
            residual_u: zeros(),
            residual_v: zeros(),
            residual_w: zeros(),
            puddle: [0.0; 3],
        }
    }

    /// Add the increments to the store, one node lock at a time.
    pub(crate) fn scatter(&self, store: &LayeredStore) {
        for (j, &n) in self.nodes.iter().enumerate() {
            let mut s = store.lock(n);
            for (q, values) in [
                (Quantity::ResidualU, &self.residual_u[j]),
                (Quantity::ResidualV, &self.residual_v[j]),
                (Quantity::ResidualW, &self.residual_w[j]),
            ] {
                for (r, add) in s.column_mut(q).iter_mut().zip(values) {
                    *r += add;
                }
            }
            s.puddle = s.puddle.max(self.puddle[j]);
        }
    }
}

/// Shared parameters of the element kernel for one assembly pass.
pub(crate) struct ElementAssembler<'a> {
    store: &'a LayeredStore,
    policy: WetDryPolicy,
    turbulence: TurbulenceClosure,
    g: f64,
    coriolis: f64,
    seepage_rate: f64,
}

fn mean3(values: [f64; 3]) -> f64 {
    (values[0] + values[1] + values[2]) / 3.0
}

/// Fractions of an element's layer divergence booked at its three nodes.
///
/// Converging flow is split evenly, so dry nodes can take up water. A net
/// outflow is drawn from the nodes in proportion to their wetting factor and
/// never from a dry node. The fractions always sum to one.
fn continuity_shares(divergence: f64, wets: [f64; 3]) -> [f64; 3] {
    let total = wets[0] + wets[1] + wets[2];
    if divergence <= 0.0 || !(total > 0.0) {
        [1.0 / 3.0; 3]
    } else {
        wets.map(|w| w / total)
    }
}

impl<'a> ElementAssembler<'a> {
    pub(crate) fn new(store: &'a LayeredStore, config: &SolverConfig, ctx: &SimulationContext) -> Self {
        Self {
            store,
            policy: WetDryPolicy::new(ctx.watt),
            turbulence: TurbulenceClosure::new(
                config.smagorinsky,
                config.min_horizontal_viscosity,
                config.min_vertical_viscosity,
            ),
            g: ctx.g,
            coriolis: ctx.coriolis,
            seepage_rate: config.seepage_rate,
        }
    }

    /// Gather, compute and scatter one element; returns its admissible step.
    pub(crate) fn assemble_element(&self, geometry: &ElementGeometry) -> f64 {
        let samples = self.gather(geometry);
        let (contribution, tau) = self.compute(geometry, &samples);
        contribution.scatter(self.store);
        tau
    }

    pub(crate) fn gather(&self, geometry: &ElementGeometry) -> [NodeSample; 3] {
        let levels = self.store.levels();
        geometry
            .nodes
            .map(|n| NodeSample::gather(&self.store.lock(n), levels))
    }

    /// Residual increments and the smallest stabilization time scale.
    ///
    /// Returns `f64::INFINITY` as time scale when no layer is assembled.
    pub(crate) fn compute(
        &self,
        geometry: &ElementGeometry,
        samples: &[NodeSample; 3],
    ) -> (ElementContribution, f64) {
        let n_layers = self.store.n_layers();
        let mut out = ElementContribution::new(geometry.nodes, n_layers);

        let depths = [samples[0].depth, samples[1].depth, samples[2].depth];
        let bottoms = [samples[0].bottom, samples[1].bottom, samples[2].bottom];
        let wets = [samples[0].wet, samples[1].wet, samples[2].wet];
        let area = geometry.area;
        let a3 = area / 3.0;

        out.puddle = WetDryPolicy::puddle_candidates(wets);
        let wetness = self.policy.classify(depths, bottoms);

        let layer = |k: usize, f: fn(&NodeSample) -> &Vec<f64>| -> [f64; 3] {
            [f(&samples[0])[k], f(&samples[1])[k], f(&samples[2])[k]]
        };

        // Discharge divergence of every layer holding water at any node. It
        // is booked for all elements, dry ones included, so that the fluxes
        // through shared edges cancel.
        let mut divergence = vec![0.0; n_layers];
        for (k, div) in divergence.iter_mut().enumerate() {
            let d = layer(k, |s| &s.d);
            if d.iter().all(|&x| x <= 0.0) {
                continue;
            }
            let u = layer(k, |s| &s.u);
            let v = layer(k, |s| &s.v);
            let qx = [u[0] * d[0], u[1] * d[1], u[2] * d[2]];
            let qy = [v[0] * d[0], v[1] * d[1], v[2] * d[2]];
            *div = geometry.gradient(qx).0 + geometry.gradient(qy).1;
            for (j, share) in continuity_shares(*div, wets).into_iter().enumerate() {
                let s = &samples[j];
                out.residual_w[j][k.clamp(s.surface, s.bed)] += area * share * *div;
            }
        }

        if wetness.fully_dry {
            for (j, s) in samples.iter().enumerate() {
                if s.seepage {
                    out.residual_w[j][s.surface] +=
                        self.policy.seepage_velocity(s.depth, self.seepage_rate) * a3;
                }
            }
            return (out, f64::INFINITY);
        }

        let top = samples.iter().map(|s| s.surface).max().unwrap_or(0);
        let lowest = samples.iter().map(|s| s.bed).min().unwrap_or(0);
        if top > lowest {
            return (out, f64::INFINITY);
        }

        let etas = [samples[0].eta, samples[1].eta, samples[2].eta];
        let eta_star = self.policy.effective_levels(etas, wets, depths, wetness);
        let (detadx, detady) = geometry.gradient(eta_star);
        let (dzdx, dzdy) = geometry.gradient(bottoms);
        let slope = (1.0 + dzdx * dzdx + dzdy * dzdy).sqrt();

        let watt = self.policy.watt;
        let depth_m = mean3(depths);
        let wet_m = mean3(wets);
        // Continuity stabilization sums to zero over the element only with a
        // common weight; the driest node sets it so no dry node is drawn on.
        let wet_min = wets[0].min(wets[1]).min(wets[2]);
        let ustar_m = mean3(samples.each_ref().map(|s| s.shear_velocity));
        let (rad_x, rad_y) = match samples.each_ref().map(|s| s.wave) {
            [Some(a), Some(b), Some(c)] => radiation_acceleration(geometry, [a, b, c], depth_m, watt),
            _ => (0.0, 0.0),
        };

        let continuity =
            mean3(samples.each_ref().map(|s| s.detadt)) + divergence.iter().sum::<f64>();

        let celerity = (self.g * depth_m.max(watt)).sqrt();
        let mut min_tau = f64::INFINITY;

        for k in top..=lowest {
            let u = layer(k, |s| &s.u);
            let v = layer(k, |s| &s.v);
            let u_m = mean3(u);
            let v_m = mean3(v);
            let w_m = mean3(layer(k, |s| &s.w));
            let d_m = mean3(layer(k, |s| &s.d));
            let dudz = mean3(layer(k, |s| &s.dudz));
            let dvdz = mean3(layer(k, |s| &s.dvdz));
            let d2u = mean3(layer(k, |s| &s.d2u));
            let d2v = mean3(layer(k, |s| &s.d2v));
            let cf = mean3(layer(k, |s| &s.friction));
            let wind_x = mean3(layer(k, |s| &s.wind_x));
            let wind_y = mean3(layer(k, |s| &s.wind_y));
            let height = mean3(layer(k, |s| &s.height));

            let (dudx, dudy) = geometry.gradient(u);
            let (dvdx, dvdy) = geometry.gradient(v);
            let speed = u_m.hypot(v_m);

            let tau = 0.5 * geometry.streamline_length(u_m, v_m) / (celerity + speed);
            min_tau = min_tau.min(tau);

            let nu_h = self
                .turbulence
                .horizontal(area, (dudx, dudy), (dvdx, dvdy), ustar_m, depth_m);
            let nu_v = self.turbulence.vertical(
                height,
                depth_m,
                dudz.hypot(dvdz),
                ustar_m,
                k == lowest,
            );

            let d_eff = d_m.max(watt);
            let drag = cf * speed * slope / d_eff;
            let r_u = u_m * dudx + v_m * dudy + w_m * dudz + self.g * wet_m * detadx
                - self.coriolis * v_m
                - nu_v * d2u
                + drag * u_m
                - wind_x / d_eff
                - rad_x;
            let r_v = u_m * dvdx + v_m * dvdy + w_m * dvdz + self.g * wet_m * detady
                + self.coriolis * u_m
                - nu_v * d2v
                + drag * v_m
                - wind_y / d_eff
                - rad_y;

            for j in 0..3 {
                let (b, c) = (geometry.b[j], geometry.c[j]);
                let streamline = u_m * b + v_m * c;
                let supg = area * tau * streamline;
                let grad_div = area * tau * self.g * continuity;

                out.residual_u[j][k] += -a3 * r_u - supg * r_u - grad_div * b
                    - area * nu_h * (b * dudx + c * dudy);
                out.residual_v[j][k] += -a3 * r_v - supg * r_v - grad_div * c
                    - area * nu_h * (b * dvdx + c * dvdy);
                out.residual_w[j][k] += wet_min * area * tau * d_m * (b * r_u + c * r_v);
            }
        }

        (out, min_tau)
    }
}
