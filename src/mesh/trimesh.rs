//! Unstructured triangular mesh.
//!
//! [`TriMesh`] stores node coordinates, initial bed depths and triangle
//! connectivity. Construction validates indices, reorients clockwise
//! triangles and rejects degenerate ones. Boundary edges (edges owned by a
//! single triangle) are walls unless tagged [`BoundaryTag::Open`].
//!
//! ```
//! use tidal_fe::mesh::{MeshTopology, TriMesh};
//!
//! // 2 × 1 cells on [0, 200] × [0, 100], flat bed 5 m deep.
//! let mesh = TriMesh::uniform_rectangle(0.0, 200.0, 0.0, 100.0, 2, 1, |_, _| 5.0);
//! assert_eq!(mesh.n_nodes(), 6);
//! assert_eq!(mesh.n_elements(), 4);
//! ```

use std::collections::HashMap;

use super::boundary_tags::BoundaryTag;
use super::topology::MeshTopology;
use crate::error::{Result, SolverError};

/// Relative area below which a triangle counts as degenerate.
const DEGENERATE_TOL: f64 = 1.0e-12;

/// Triangle mesh with per-node bed depth.
#[derive(Clone, Debug)]
pub struct TriMesh {
    /// Node coordinates (x, y)
    positions: Vec<(f64, f64)>,
    /// Bed depth below datum, positive downward
    bottom: Vec<f64>,
    /// Counter-clockwise triangles
    elements: Vec<[usize; 3]>,
    /// Triangles incident to each node
    node_elements: Vec<Vec<usize>>,
    /// Boundary edges keyed by sorted node pair
    boundary: HashMap<(usize, usize), BoundaryTag>,
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

impl TriMesh {
    /// Build a mesh from raw arrays.
    ///
    /// # Arguments
    /// * `positions` - Node coordinates
    /// * `bottom` - Bed depth per node (positive downward)
    /// * `elements` - Triangles as node triples, either orientation
    ///
    /// # Errors
    /// [`SolverError::NodeCountMismatch`] when `bottom` does not match the
    /// node count, [`SolverError::InvalidMesh`] for out-of-range node numbers
    /// or degenerate triangles.
    pub fn new(
        positions: Vec<(f64, f64)>,
        bottom: Vec<f64>,
        mut elements: Vec<[usize; 3]>,
    ) -> Result<Self> {
        let n_nodes = positions.len();
        if bottom.len() != n_nodes {
            return Err(SolverError::NodeCountMismatch {
                dataset: "bathymetry",
                expected: n_nodes,
                found: bottom.len(),
            });
        }
        if elements.is_empty() {
            return Err(SolverError::InvalidMesh("mesh has no triangles".into()));
        }

        for (e, tri) in elements.iter_mut().enumerate() {
            if let Some(&bad) = tri.iter().find(|&&n| n >= n_nodes) {
                return Err(SolverError::InvalidMesh(format!(
                    "triangle {e} references node {bad} but mesh has {n_nodes} nodes"
                )));
            }
            let [p0, p1, p2] = tri.map(|n| positions[n]);
            let twice_area = (p1.0 - p0.0) * (p2.1 - p0.1) - (p2.0 - p0.0) * (p1.1 - p0.1);
            let scale = [p0, p1, p2]
                .iter()
                .zip([p1, p2, p0].iter())
                .map(|(a, b)| (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2))
                .fold(0.0, f64::max);
            if !(twice_area.abs() > DEGENERATE_TOL * scale) {
                return Err(SolverError::InvalidMesh(format!(
                    "triangle {e} is degenerate (area {})",
                    0.5 * twice_area
                )));
            }
            if twice_area < 0.0 {
                tri.swap(1, 2);
            }
        }

        let mut node_elements = vec![Vec::new(); n_nodes];
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for (e, tri) in elements.iter().enumerate() {
            for i in 0..3 {
                node_elements[tri[i]].push(e);
                *edge_count.entry(edge_key(tri[i], tri[(i + 1) % 3])).or_default() += 1;
            }
        }

        let boundary = edge_count
            .into_iter()
            .filter(|&(_, count)| count == 1)
            .map(|(key, _)| (key, BoundaryTag::Wall))
            .collect();

        Ok(Self {
            positions,
            bottom,
            elements,
            node_elements,
            boundary,
        })
    }

    /// Uniform rectangular mesh, each cell split into two triangles.
    ///
    /// Node `(i, j)` has number `j * (nx + 1) + i`. All boundary edges are walls.
    ///
    /// # Arguments
    /// * `x0`, `x1`, `y0`, `y1` - Domain bounds
    /// * `nx`, `ny` - Cells in each direction (at least one)
    /// * `bottom` - Bed depth as a function of position
    pub fn uniform_rectangle(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
        bottom: impl Fn(f64, f64) -> f64,
    ) -> Self {
        let nx = nx.max(1);
        let ny = ny.max(1);
        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;

        let mut positions = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                positions.push((x0 + i as f64 * dx, y0 + j as f64 * dy));
            }
        }
        let depths = positions.iter().map(|&(x, y)| bottom(x, y)).collect();

        let mut elements = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = j * (nx + 1) + i;
                let v1 = v0 + 1;
                let v2 = v1 + (nx + 1);
                let v3 = v0 + (nx + 1);
                elements.push([v0, v1, v2]);
                elements.push([v0, v2, v3]);
            }
        }

        let mut node_elements = vec![Vec::new(); positions.len()];
        for (e, tri) in elements.iter().enumerate() {
            for &n in tri {
                node_elements[n].push(e);
            }
        }

        let mut boundary = HashMap::new();
        for i in 0..nx {
            boundary.insert(edge_key(i, i + 1), BoundaryTag::Wall);
            let top = ny * (nx + 1) + i;
            boundary.insert(edge_key(top, top + 1), BoundaryTag::Wall);
        }
        for j in 0..ny {
            let left = j * (nx + 1);
            boundary.insert(edge_key(left, left + nx + 1), BoundaryTag::Wall);
            let right = left + nx;
            boundary.insert(edge_key(right, right + nx + 1), BoundaryTag::Wall);
        }

        Self {
            positions,
            bottom: depths,
            elements,
            node_elements,
            boundary,
        }
    }

    /// Tag every boundary edge whose two nodes are both in `nodes` as open.
    pub fn with_open_boundary(mut self, nodes: &[usize]) -> Self {
        let set: std::collections::HashSet<usize> = nodes.iter().copied().collect();
        for (&(a, b), tag) in self.boundary.iter_mut() {
            if set.contains(&a) && set.contains(&b) {
                *tag = BoundaryTag::Open;
            }
        }
        self
    }

    /// Tag of the edge between two nodes, `None` for interior or missing edges.
    pub fn boundary_tag(&self, a: usize, b: usize) -> Option<BoundaryTag> {
        self.boundary.get(&edge_key(a, b)).copied()
    }

    /// Nodes lying on at least one boundary edge, sorted.
    pub fn boundary_nodes(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self.boundary.keys().flat_map(|&(a, b)| [a, b]).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Nodes whose x coordinate is within `tol` of `x`, sorted.
    pub fn nodes_at_x(&self, x: f64, tol: f64) -> Vec<usize> {
        (0..self.positions.len())
            .filter(|&n| (self.positions[n].0 - x).abs() <= tol)
            .collect()
    }
}

impl MeshTopology for TriMesh {
    fn n_nodes(&self) -> usize {
        self.positions.len()
    }

    fn n_elements(&self) -> usize {
        self.elements.len()
    }

    fn position(&self, node: usize) -> (f64, f64) {
        self.positions[node]
    }

    fn bottom(&self, node: usize) -> f64 {
        self.bottom[node]
    }

    fn element_nodes(&self, element: usize) -> [usize; 3] {
        self.elements[element]
    }

    fn node_elements(&self, node: usize) -> &[usize] {
        &self.node_elements[node]
    }

    fn closed_edges(&self, element: usize) -> u8 {
        let tri = self.elements[element];
        let mut mask = 0;
        for i in 0..3 {
            if self.boundary_tag(tri[i], tri[(i + 1) % 3]) == Some(BoundaryTag::Wall) {
                mask |= 1 << i;
            }
        }
        mask
    }
}
