#![warn(missing_docs)]

//! Triangle mesh type and diagnostics for the chatcad kernel.
//!
//! [`TriMesh`] is the concrete geometry every model in the registry carries:
//! a flat f64 vertex buffer plus a u32 index buffer. The diagnostics here
//! (boundary-edge census, signed volume, bounding box, finiteness) back the
//! watertightness preconditions of the boolean kernel and the exporters.

use chatcad_kernel_math::{Point3, Transform, Vec3};
use std::collections::HashMap;

/// A triangle mesh with shared vertices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriMesh {
    /// Flat vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f64>,
    /// Flat triangle indices: `[i0, i1, i2, ...]`, CCW from outside.
    pub indices: Vec<u32>,
}

/// Quantization step used to key vertex positions when matching edges.
/// Coarser than f64 noise, far finer than any feature size.
const WELD_QUANTUM: f64 = 1e-9;

fn quantize(v: f64) -> i64 {
    (v / WELD_QUANTUM).round() as i64
}

impl TriMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True if the mesh has no triangles (a valid null solid).
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex at index `i` as a point.
    pub fn vertex(&self, i: u32) -> Point3 {
        let b = i as usize * 3;
        Point3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    /// Corner points of triangle `t`.
    pub fn triangle(&self, t: usize) -> [Point3; 3] {
        let b = t * 3;
        [
            self.vertex(self.indices[b]),
            self.vertex(self.indices[b + 1]),
            self.vertex(self.indices[b + 2]),
        ]
    }

    /// Append a vertex, returning its index.
    pub fn push_vertex(&mut self, p: Point3) -> u32 {
        let idx = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&[p.x, p.y, p.z]);
        idx
    }

    /// Append a triangle by vertex indices.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Merge another mesh into this one, offsetting its indices.
    pub fn merge(&mut self, other: &TriMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Apply an affine transform to every vertex.
    ///
    /// When the transform flips orientation (negative determinant, e.g. a
    /// mirror), triangle winding is reversed so outward normals stay
    /// outward.
    pub fn transform(&mut self, t: &Transform) {
        for chunk in self.vertices.chunks_mut(3) {
            let p = t.apply_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
            chunk[0] = p.x;
            chunk[1] = p.y;
            chunk[2] = p.z;
        }
        if t.linear_determinant() < 0.0 {
            for tri in self.indices.chunks_mut(3) {
                tri.swap(1, 2);
            }
        }
    }

    /// Transformed copy.
    pub fn transformed(&self, t: &Transform) -> TriMesh {
        let mut out = self.clone();
        out.transform(t);
        out
    }

    /// Count boundary edges: directed edges without a matching reverse
    /// edge. Vertices are matched positionally, so meshes built as
    /// triangle soup still census correctly.
    ///
    /// A watertight mesh has zero boundary edges.
    pub fn boundary_edge_count(&self) -> usize {
        let key = |i: u32| {
            let p = self.vertex(i);
            (quantize(p.x), quantize(p.y), quantize(p.z))
        };
        let mut edges: HashMap<_, i64> = HashMap::new();
        for tri in self.indices.chunks(3) {
            for e in 0..3 {
                let a = key(tri[e]);
                let b = key(tri[(e + 1) % 3]);
                // A directed edge cancels against its reverse.
                if a <= b {
                    *edges.entry((a, b)).or_insert(0) += 1;
                } else {
                    *edges.entry((b, a)).or_insert(0) -= 1;
                }
            }
        }
        edges.values().filter(|&&c| c != 0).count()
    }

    /// True if every edge is shared by exactly two opposed faces.
    pub fn is_watertight(&self) -> bool {
        !self.is_empty() && self.boundary_edge_count() == 0
    }

    /// Signed volume via the divergence theorem. Positive for a closed
    /// mesh with outward-facing CCW triangles.
    pub fn signed_volume(&self) -> f64 {
        let mut vol = 0.0;
        for t in 0..self.num_triangles() {
            let [v0, v1, v2] = self.triangle(t);
            vol += v0.x * (v1.y * v2.z - v2.y * v1.z) - v1.x * (v0.y * v2.z - v2.y * v0.z)
                + v2.x * (v0.y * v1.z - v1.y * v0.z);
        }
        vol / 6.0
    }

    /// Absolute volume.
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        let mut area = 0.0;
        for t in 0..self.num_triangles() {
            let [v0, v1, v2] = self.triangle(t);
            area += (v1 - v0).cross(&(v2 - v0)).norm() / 2.0;
        }
        area
    }

    /// Axis-aligned bounding box as `(min, max)`. `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut min = Vec3::repeat(f64::MAX);
        let mut max = Vec3::repeat(f64::MIN);
        for chunk in self.vertices.chunks(3) {
            for i in 0..3 {
                min[i] = min[i].min(chunk[i]);
                max[i] = max[i].max(chunk[i]);
            }
        }
        Some((Point3::from(min), Point3::from(max)))
    }

    /// True if every vertex coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|v| v.is_finite())
    }

    /// Count degenerate faces (zero or near-zero area).
    pub fn degenerate_face_count(&self, eps: f64) -> usize {
        (0..self.num_triangles())
            .filter(|&t| {
                let [v0, v1, v2] = self.triangle(t);
                (v1 - v0).cross(&(v2 - v0)).norm() / 2.0 < eps
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatcad_kernel_math::Transform;

    /// Unit tetrahedron with outward CCW winding.
    fn tetrahedron() -> TriMesh {
        let mut m = TriMesh::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = m.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = m.push_vertex(Point3::new(0.0, 1.0, 0.0));
        let d = m.push_vertex(Point3::new(0.0, 0.0, 1.0));
        m.push_triangle(a, c, b);
        m.push_triangle(a, b, d);
        m.push_triangle(b, c, d);
        m.push_triangle(a, d, c);
        m
    }

    #[test]
    fn tetrahedron_is_watertight() {
        let m = tetrahedron();
        assert_eq!(m.boundary_edge_count(), 0);
        assert!(m.is_watertight());
    }

    #[test]
    fn open_triangle_has_boundary() {
        let mut m = TriMesh::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = m.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = m.push_vertex(Point3::new(0.0, 1.0, 0.0));
        m.push_triangle(a, b, c);
        assert_eq!(m.boundary_edge_count(), 3);
        assert!(!m.is_watertight());
    }

    #[test]
    fn soup_census_matches_positionally() {
        // Same tetrahedron but with all vertices duplicated per face.
        let shared = tetrahedron();
        let mut soup = TriMesh::new();
        for t in 0..shared.num_triangles() {
            let [v0, v1, v2] = shared.triangle(t);
            let a = soup.push_vertex(v0);
            let b = soup.push_vertex(v1);
            let c = soup.push_vertex(v2);
            soup.push_triangle(a, b, c);
        }
        assert!(soup.is_watertight());
    }

    #[test]
    fn tetrahedron_volume() {
        let m = tetrahedron();
        assert!((m.signed_volume() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn merge_offsets_indices() {
        let mut a = tetrahedron();
        let b = tetrahedron();
        a.merge(&b);
        assert_eq!(a.num_triangles(), 8);
        assert_eq!(a.num_vertices(), 8);
        assert!(a.indices[12..].iter().all(|&i| i >= 4));
    }

    #[test]
    fn transform_scales_volume() {
        let mut m = tetrahedron();
        m.transform(&Transform::scale(2.0, 2.0, 2.0));
        assert!((m.signed_volume() - 8.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn mirror_preserves_positive_volume() {
        let mut m = tetrahedron();
        m.transform(&Transform::scale(-1.0, 1.0, 1.0));
        // Winding flipped along with orientation, so signed volume stays
        // positive.
        assert!(m.signed_volume() > 0.0);
    }

    #[test]
    fn bounding_box() {
        let m = tetrahedron();
        let (min, max) = m.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
        assert!(TriMesh::new().bounding_box().is_none());
    }

    #[test]
    fn degenerate_face_detection() {
        let mut m = TriMesh::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = m.push_vertex(Point3::new(1.0, 0.0, 0.0));
        m.push_triangle(a, b, a);
        assert_eq!(m.degenerate_face_count(1e-12), 1);
        assert!(m.is_finite());
    }
}
