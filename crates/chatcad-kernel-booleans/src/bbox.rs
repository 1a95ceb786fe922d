//! Axis-aligned bounding boxes for the boolean broadphase.

use chatcad_kernel_math::Point3;
use chatcad_kernel_mesh::TriMesh;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Bounding box of a mesh, `None` if the mesh has no vertices.
    pub fn of_mesh(mesh: &TriMesh) -> Option<Self> {
        mesh.bounding_box().map(|(min, max)| Self { min, max })
    }

    /// True if the boxes overlap, inflated by `margin` on each side so
    /// surface-coincident solids still reach the clipping pipeline.
    pub fn overlaps(&self, other: &Aabb, margin: f64) -> bool {
        for i in 0..3 {
            if self.max[i] + margin < other.min[i] || other.max[i] + margin < self.min[i] {
                return false;
            }
        }
        true
    }
}
