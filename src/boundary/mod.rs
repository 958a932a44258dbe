//! Boundary conditions.
//!
//! Boundary forcings ([`BoundaryForcing`](crate::forcing::BoundaryForcing))
//! are attached to nodes through the solver. The per-step pass in
//! [`applicator`] then imposes them together with wetting corrections,
//! extrapolation, wall slip and the friction and wind coefficients used by
//! assembly.
//!
//! Node lists handed to the solver may come from external boundary files and
//! can name nodes that are not in the mesh. By default such entries are
//! logged and dropped; with
//! [`strict_boundary_nodes`](crate::config::SolverConfig::strict_boundary_nodes)
//! they are an error.

pub(crate) mod applicator;

use crate::error::{Result, SolverError};

/// Filter a caller-supplied node list against the mesh size.
///
/// Duplicates are removed; order is preserved otherwise.
pub(crate) fn resolve_nodes(nodes: &[usize], n_nodes: usize, strict: bool) -> Result<Vec<usize>> {
    let mut out: Vec<usize> = Vec::with_capacity(nodes.len());
    for &node in nodes {
        if node >= n_nodes {
            if strict {
                return Err(SolverError::UnknownBoundaryNode { node });
            }
            log::warn!("ignoring boundary assignment to unknown node {node} (mesh has {n_nodes})");
            continue;
        }
        if !out.contains(&node) {
            out.push(node);
        }
    }
    Ok(out)
}
