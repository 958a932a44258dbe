//! Element assembly of the momentum and continuity residuals.
//!
//! Every triangle contributes, per layer, to the residual channels of its
//! three nodes:
//!
//! ```text
//! R_u,j += -(A/3)·R_u - A·τ·(u·b_j + v·c_j)·R_u - A·τ·g·b_j·R_c - A·ν_h·(b_j·∂u/∂x + c_j·∂u/∂y)
//! R_w,j += s_j·A·div_k + wet_min·A·τ·d·(b_j·R_u + c_j·R_v)
//! ```
//!
//! where `R_u` is the strong-form momentum residual at the element centroid,
//! `R_c` the depth-integrated continuity residual and
//! `τ = 0.5·L / (√(g·max(H, WATT)) + |u|)` the stabilization time scale over
//! the streamline length `L`. The smallest `τ` over all elements and layers
//! is the admissible time step.
//!
//! The discharge divergence `div_k` is booked for every layer and every
//! element. The shares `s_j` sum to one: converging flow is split evenly and
//! a net outflow is drawn from the nodes by wetting factor. A layer outside a
//! node's water column lands in its nearest active layer. Summed over a
//! closed mesh the continuity residual therefore vanishes.
//!
//! Momentum is assembled only on layers shared by all three nodes. A dry
//! node keeps a single layer around its bed. Fully dry elements add seepage
//! and no momentum.
//!
//! Elements are processed in parallel when the `parallel` feature is on.
//! Each element gathers its nodes under their locks, computes without any
//! lock held and scatters with one lock per node.

mod element;

pub(crate) use element::ElementAssembler;

use crate::config::{AssemblyOrder, SimulationContext, SolverConfig};
use crate::mesh::ElementGeometry;
use crate::state::LayeredStore;

/// Assemble all elements into the store's residual channels.
///
/// Residual channels must have been cleared beforehand. Returns the
/// admissible time step, `f64::INFINITY` when no element is wet.
pub(crate) fn assemble(
    store: &LayeredStore,
    geometry: &[ElementGeometry],
    config: &SolverConfig,
    ctx: &SimulationContext,
) -> f64 {
    let assembler = ElementAssembler::new(store, config, ctx);

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        match config.assembly_order {
            AssemblyOrder::Forward => geometry
                .par_iter()
                .map(|e| assembler.assemble_element(e))
                .reduce(|| f64::INFINITY, f64::min),
            AssemblyOrder::Reverse => geometry
                .par_iter()
                .rev()
                .map(|e| assembler.assemble_element(e))
                .reduce(|| f64::INFINITY, f64::min),
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        let step = |e: &ElementGeometry| assembler.assemble_element(e);
        match config.assembly_order {
            AssemblyOrder::Forward => geometry.iter().map(step).fold(f64::INFINITY, f64::min),
            AssemblyOrder::Reverse => geometry.iter().rev().map(step).fold(f64::INFINITY, f64::min),
        }
    }
}
