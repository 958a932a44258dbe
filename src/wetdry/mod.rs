//! Wetting and drying rules.
//!
//! A node is wet when its depth reaches the threshold WATT and fully dry
//! below WATT/2. In between, the wetting factor `min(1, H/WATT)` blends the
//! node out of the pressure gradient and the continuity coupling.
//!
//! Three element-level rules keep a wet/dry front from generating spurious
//! currents:
//!
//! - **Surface gradient.** When one to three nodes of a triangle are below
//!   WATT, each node's level is blended with an anchor level,
//!   `η*_j = wf_j·η_j + (1 - wf_j)·min(η_j, anchor)`. The anchor is the mean
//!   level of the wet nodes, or the level of the deepest node when none is wet.
//!   A dry node perched above its wet neighbours can only pull the surface
//!   down, never push water uphill.
//! - **Seepage.** A triangle whose three nodes are all fully dry adds a small
//!   downward vertical velocity at seepage-eligible nodes so that stranded
//!   films drain toward the bed.
//! - **Puddles.** Each node remembers the largest wetting factor among the
//!   other nodes of its triangles. A wet node surrounded by dry ones has its
//!   velocity damped to zero.
//!
//! # References
//! - Medeiros & Hagen (2013), "Review of wetting and drying algorithms for
//!   numerical tidal flow models"

/// Fraction of WATT by which a wet neighbour must undercut a dry node's
/// level before seepage is suppressed.
const SEEPAGE_MARGIN: f64 = 0.9;

/// Wetting state of one triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementWetness {
    /// Number of nodes shallower than WATT
    pub below_watt: u8,
    /// All three nodes shallower than WATT/2
    pub fully_dry: bool,
    /// Local index of the node with the deepest bed
    pub deepest: usize,
}

/// Wetting thresholds and the rules built on them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WetDryPolicy {
    /// Wetting threshold WATT (m)
    pub watt: f64,
    /// Fully-dry threshold WATT/2 (m)
    pub half_watt: f64,
}

impl WetDryPolicy {
    /// Policy for the given wetting threshold.
    pub fn new(watt: f64) -> Self {
        Self {
            watt,
            half_watt: 0.5 * watt,
        }
    }

    /// `min(1, H / WATT)`, zero for non-positive or NaN depth.
    #[inline]
    pub fn wet_factor(&self, depth: f64) -> f64 {
        if depth > 0.0 { (depth / self.watt).min(1.0) } else { 0.0 }
    }

    /// Depth below WATT.
    #[inline]
    pub fn is_dry(&self, depth: f64) -> bool {
        depth < self.watt
    }

    /// Depth below WATT/2.
    #[inline]
    pub fn is_fully_dry(&self, depth: f64) -> bool {
        depth < self.half_watt
    }

    /// Classify a triangle from its nodal depths and bed depths.
    pub fn classify(&self, depths: [f64; 3], bottoms: [f64; 3]) -> ElementWetness {
        let below_watt = depths.iter().filter(|&&h| self.is_dry(h)).count() as u8;
        let fully_dry = depths.iter().all(|&h| self.is_fully_dry(h));
        let mut deepest = 0;
        for j in 1..3 {
            if bottoms[j] > bottoms[deepest] {
                deepest = j;
            }
        }
        ElementWetness {
            below_watt,
            fully_dry,
            deepest,
        }
    }

    /// Levels used for the surface gradient of a triangle.
    ///
    /// Returns the raw levels when every node is wet.
    pub fn effective_levels(
        &self,
        levels: [f64; 3],
        wet_factors: [f64; 3],
        depths: [f64; 3],
        wetness: ElementWetness,
    ) -> [f64; 3] {
        if wetness.below_watt == 0 {
            return levels;
        }
        let anchor = if wetness.below_watt < 3 {
            let (sum, count) = (0..3)
                .filter(|&j| !self.is_dry(depths[j]))
                .fold((0.0, 0), |(s, c), j| (s + levels[j], c + 1));
            sum / count as f64
        } else {
            levels[wetness.deepest]
        };
        let mut out = levels;
        for j in 0..3 {
            let wf = wet_factors[j];
            out[j] = wf * levels[j] + (1.0 - wf) * levels[j].min(anchor);
        }
        out
    }

    /// Seepage velocity injected at a fully dry node of depth `depth`.
    ///
    /// Scales linearly from `rate` on bare ground to zero at WATT/2.
    #[inline]
    pub fn seepage_velocity(&self, depth: f64, rate: f64) -> f64 {
        rate * (1.0 - depth / self.half_watt).max(0.0)
    }

    /// Puddle candidates of a triangle: for each node, the largest wetting
    /// factor among the other two.
    #[inline]
    pub fn puddle_candidates(wet_factors: [f64; 3]) -> [f64; 3] {
        [
            wet_factors[1].max(wet_factors[2]),
            wet_factors[0].max(wet_factors[2]),
            wet_factors[0].max(wet_factors[1]),
        ]
    }

    /// Whether a dry node may seep.
    ///
    /// Seepage is suppressed as soon as one wet neighbour lies lower than the
    /// node's own level plus `0.9·WATT`, since water would then drain sideways.
    pub fn seepage_allowed(
        &self,
        level: f64,
        depth: f64,
        neighbours: impl IntoIterator<Item = (f64, f64)>,
    ) -> bool {
        if !self.is_dry(depth) {
            return true;
        }
        !neighbours.into_iter().any(|(eta_m, depth_m)| {
            !self.is_dry(depth_m) && eta_m < level + SEEPAGE_MARGIN * self.watt
        })
    }

    /// Cap a velocity at the shallow-water wave speed `√(g·max(H, WATT))`.
    #[inline]
    pub fn froude_cap(&self, u: f64, v: f64, depth: f64, g: f64) -> (f64, f64) {
        let limit = (g * depth.max(self.watt)).sqrt();
        let speed = u.hypot(v);
        if speed > limit {
            let scale = limit / speed;
            (u * scale, v * scale)
        } else {
            (u, v)
        }
    }
}
