//! Linear-triangle geometry.
//!
//! For a counter-clockwise triangle with vertices (x_j, y_j) the linear
//! shape functions have constant gradients
//!
//! ```text
//! b_j = ∂N_j/∂x = (y_{j+1} - y_{j+2}) / 2A
//! c_j = ∂N_j/∂y = (x_{j+2} - x_{j+1}) / 2A
//! ```
//!
//! with indices taken modulo 3. The stabilization length uses the triangle
//! heights, `h_j = 2A / |edge opposite j|`.

use super::topology::MeshTopology;

/// Geometric factors of one triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementGeometry {
    /// Global node numbers (counter-clockwise)
    pub nodes: [usize; 3],
    /// Area (m²)
    pub area: f64,
    /// ∂N_j/∂x
    pub b: [f64; 3],
    /// ∂N_j/∂y
    pub c: [f64; 3],
    /// Length of the edge from local node i to i+1
    pub edge_lengths: [f64; 3],
    /// Height of the triangle measured from node j to the opposite edge
    pub heights: [f64; 3],
    /// Closed-edge bitmask (bit i: edge i to i+1 is a wall)
    pub closed_edges: u8,
}

impl ElementGeometry {
    /// Compute the geometric factors from vertex coordinates.
    ///
    /// Orientation is not checked here; a clockwise triangle yields a
    /// negative area. [`TriMesh`](super::TriMesh) reorients on construction.
    pub fn new(nodes: [usize; 3], coords: [(f64, f64); 3], closed_edges: u8) -> Self {
        let [(x0, y0), (x1, y1), (x2, y2)] = coords;
        let twice_area = (x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0);
        let inv = 1.0 / twice_area;

        let b = [(y1 - y2) * inv, (y2 - y0) * inv, (y0 - y1) * inv];
        let c = [(x2 - x1) * inv, (x0 - x2) * inv, (x1 - x0) * inv];

        let edge_lengths = [
            (x1 - x0).hypot(y1 - y0),
            (x2 - x1).hypot(y2 - y1),
            (x0 - x2).hypot(y0 - y2),
        ];
        // The edge opposite node j runs from j+1 to j+2, which is edge j+1.
        let heights = [
            twice_area.abs() / edge_lengths[1],
            twice_area.abs() / edge_lengths[2],
            twice_area.abs() / edge_lengths[0],
        ];

        Self {
            nodes,
            area: 0.5 * twice_area,
            b,
            c,
            edge_lengths,
            heights,
            closed_edges,
        }
    }

    /// Gradient of a linear field given by its three nodal values.
    #[inline]
    pub fn gradient(&self, values: [f64; 3]) -> (f64, f64) {
        let mut gx = 0.0;
        let mut gy = 0.0;
        for j in 0..3 {
            gx += self.b[j] * values[j];
            gy += self.c[j] * values[j];
        }
        (gx, gy)
    }

    /// Smallest triangle height.
    pub fn min_height(&self) -> f64 {
        self.heights.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Element length along the flow direction, `2|u| / Σ_j |u·∇N_j|`.
    ///
    /// Falls back to the smallest height when the velocity is negligible.
    pub fn streamline_length(&self, u: f64, v: f64) -> f64 {
        let speed = u.hypot(v);
        let projected: f64 = (0..3).map(|j| (u * self.b[j] + v * self.c[j]).abs()).sum();
        if speed < 1.0e-8 || projected <= f64::EPSILON * speed {
            self.min_height()
        } else {
            2.0 * speed / projected
        }
    }

    /// True when edge `i` (local node i to i+1) is a wall.
    #[inline]
    pub fn is_closed(&self, edge: usize) -> bool {
        self.closed_edges & (1 << edge) != 0
    }
}

/// How a node touches the closed boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WallContact {
    /// On a straight wall with outward unit normal (nx, ny); the normal
    /// velocity component is removed.
    Slip(f64, f64),
    /// Where walls meet at an angle; the velocity is removed entirely.
    Corner,
}

/// Wall contact of every node.
///
/// Nodes on a single straight wall get [`WallContact::Slip`] with the unit
/// outward normal, nodes where wall edges meet at an angle get
/// [`WallContact::Corner`], all others `None`.
pub fn wall_contacts<M: MeshTopology + ?Sized>(mesh: &M) -> Vec<Option<WallContact>> {
    let mut normals: Vec<Vec<(f64, f64)>> = vec![Vec::new(); mesh.n_nodes()];

    for e in 0..mesh.n_elements() {
        let mask = mesh.closed_edges(e);
        if mask == 0 {
            continue;
        }
        let nodes = mesh.element_nodes(e);
        for i in 0..3 {
            if mask & (1 << i) == 0 {
                continue;
            }
            let a = nodes[i];
            let b = nodes[(i + 1) % 3];
            let (xa, ya) = mesh.position(a);
            let (xb, yb) = mesh.position(b);
            // Outward normal of a counter-clockwise edge.
            let (nx, ny) = (yb - ya, xa - xb);
            let len = nx.hypot(ny);
            if len > 0.0 {
                normals[a].push((nx / len, ny / len));
                normals[b].push((nx / len, ny / len));
            }
        }
    }

    normals
        .into_iter()
        .map(|list| {
            let &(n0x, n0y) = list.first()?;
            let straight = list
                .iter()
                .all(|&(nx, ny)| (n0x * ny - n0y * nx).abs() < 1.0e-6 && n0x * nx + n0y * ny > 0.0);
            if straight {
                Some(WallContact::Slip(n0x, n0y))
            } else {
                Some(WallContact::Corner)
            }
        })
        .collect()
}
