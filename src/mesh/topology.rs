//! Mesh topology trait consumed by the solver.
//!
//! The solver never looks at a concrete mesh type. It asks a
//! [`MeshTopology`] for counts, node positions, triangle incidence and the
//! closed-edge flags of each triangle. Geometry (shape-function gradients,
//! areas, lumped masses) has default implementations derived from those
//! primitives, so a mesh reader only has to supply connectivity.

use super::geometry::ElementGeometry;

/// Triangle mesh connectivity and node coordinates.
///
/// Node and element numbers are plain `usize` in `[0, n_nodes)` and
/// `[0, n_elements)`. Triangles are expected counter-clockwise.
pub trait MeshTopology: Send + Sync {
    /// Number of nodes.
    fn n_nodes(&self) -> usize;

    /// Number of triangles.
    fn n_elements(&self) -> usize;

    /// Horizontal position (x, y) of a node.
    fn position(&self, node: usize) -> (f64, f64);

    /// Initial bed depth below datum (positive downward) of a node.
    fn bottom(&self, node: usize) -> f64;

    /// The three nodes of a triangle, counter-clockwise.
    fn element_nodes(&self, element: usize) -> [usize; 3];

    /// Triangles incident to a node.
    fn node_elements(&self, node: usize) -> &[usize];

    /// Closed-edge bitmask of a triangle. Bit `i` is set when the edge from
    /// local node `i` to local node `(i + 1) % 3` is a wall.
    fn closed_edges(&self, _element: usize) -> u8 {
        0
    }

    /// Shape-function gradients, area and edge data of a triangle.
    fn element_geometry(&self, element: usize) -> ElementGeometry {
        let nodes = self.element_nodes(element);
        let coords = nodes.map(|n| self.position(n));
        ElementGeometry::new(nodes, coords, self.closed_edges(element))
    }

    /// Lumped mass of a node: one third of the area of every incident triangle.
    fn lumped_mass(&self, node: usize) -> f64 {
        self.node_elements(node)
            .iter()
            .map(|&e| self.element_geometry(e).area / 3.0)
            .sum()
    }

    /// Nodes sharing a triangle with `node`, sorted and without `node` itself.
    fn node_neighbors(&self, node: usize) -> Vec<usize> {
        let mut neighbors: Vec<usize> = self
            .node_elements(node)
            .iter()
            .flat_map(|&e| self.element_nodes(e))
            .filter(|&n| n != node)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }
}
