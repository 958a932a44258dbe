//! Horizontal mesh: topology trait, triangle geometry and a concrete
//! unstructured triangle mesh.

mod boundary_tags;
mod geometry;
mod topology;
mod trimesh;

pub use boundary_tags::BoundaryTag;
pub use geometry::{ElementGeometry, WallContact, wall_contacts};
pub use topology::MeshTopology;
pub use trimesh::TriMesh;
