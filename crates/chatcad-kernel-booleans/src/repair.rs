//! Seam repair for clipped meshes.
//!
//! BSP clipping splits each operand against the other's plane set, so the
//! two sides of a shared seam can disagree about subdivision: one side
//! keeps a single long edge where the other carries several short
//! fragments. Those T-vertices break the two-faces-per-edge property even
//! though the surface is geometrically closed. Welding coincident
//! vertices and then splitting every edge at the vertices lying on its
//! interior restores exact edge pairing.

use chatcad_kernel_math::Point3;
use chatcad_kernel_mesh::TriMesh;
use std::collections::HashMap;

/// Quantization step for welding coincident vertices, matching the
/// boundary-edge census resolution.
const WELD_QUANTUM: f64 = 1e-9;

fn key(p: &Point3) -> (i64, i64, i64) {
    let q = |v: f64| (v / WELD_QUANTUM).round() as i64;
    (q(p.x), q(p.y), q(p.z))
}

/// Rebuild `mesh` with coincident vertices welded and every edge split at
/// the welded vertices that lie strictly inside it.
pub(crate) fn repair_seams(mesh: &TriMesh, eps: f64) -> TriMesh {
    let (verts, mut work) = weld(mesh);
    let mut tris: Vec<[u32; 3]> = Vec::with_capacity(work.len());
    while let Some(tri) = work.pop() {
        match find_edge_vertex(&verts, tri, eps) {
            Some((e, k)) => {
                let a = tri[e];
                let b = tri[(e + 1) % 3];
                let c = tri[(e + 2) % 3];
                work.push([a, k, c]);
                work.push([k, b, c]);
            }
            None => tris.push(tri),
        }
    }

    let mut out = TriMesh::new();
    for p in &verts {
        out.push_vertex(*p);
    }
    for [a, b, c] in tris {
        out.push_triangle(a, b, c);
    }
    out
}

/// Deduplicate vertices positionally, dropping triangles that collapse.
fn weld(mesh: &TriMesh) -> (Vec<Point3>, Vec<[u32; 3]>) {
    let mut seen: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut verts: Vec<Point3> = Vec::new();
    let mut remap: Vec<u32> = Vec::with_capacity(mesh.num_vertices());
    for i in 0..mesh.num_vertices() {
        let p = mesh.vertex(i as u32);
        let idx = *seen.entry(key(&p)).or_insert_with(|| {
            verts.push(p);
            (verts.len() - 1) as u32
        });
        remap.push(idx);
    }
    let mut tris = Vec::with_capacity(mesh.num_triangles());
    for t in mesh.indices.chunks(3) {
        let (a, b, c) = (
            remap[t[0] as usize],
            remap[t[1] as usize],
            remap[t[2] as usize],
        );
        if a != b && b != c && a != c {
            tris.push([a, b, c]);
        }
    }
    (verts, tris)
}

/// Find a welded vertex lying strictly inside one of the triangle's
/// edges. Returns the edge index and the vertex.
fn find_edge_vertex(verts: &[Point3], tri: [u32; 3], eps: f64) -> Option<(usize, u32)> {
    for e in 0..3 {
        let a = verts[tri[e] as usize];
        let b = verts[tri[(e + 1) % 3] as usize];
        let ab = b - a;
        let len2 = ab.norm_squared();
        if len2 <= eps * eps {
            continue;
        }
        for k in 0..verts.len() as u32 {
            if tri.contains(&k) {
                continue;
            }
            let p = verts[k as usize];
            let t = (p - a).dot(&ab) / len2;
            if t <= 0.0 || t >= 1.0 {
                continue;
            }
            if (p - (a + ab * t)).norm() > eps {
                continue;
            }
            // Endpoint-coincident points are not interior splits.
            if (p - a).norm() < eps || (p - b).norm() < eps {
                continue;
            }
            return Some((e, k));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Zero-volume sandwich: a square covered by 2 triangles on top and,
    /// facing the other way, 3 triangles whose bottom edge is split at a
    /// midpoint the top side does not share.
    fn cracked_sandwich() -> TriMesh {
        let mut m = TriMesh::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = m.push_vertex(Point3::new(2.0, 0.0, 0.0));
        let c = m.push_vertex(Point3::new(2.0, 2.0, 0.0));
        let d = m.push_vertex(Point3::new(0.0, 2.0, 0.0));
        let mid = m.push_vertex(Point3::new(1.0, 0.0, 0.0));
        // Top, facing +Z.
        m.push_triangle(a, b, c);
        m.push_triangle(a, c, d);
        // Bottom, facing -Z, subdivided at `mid`.
        m.push_triangle(d, c, b);
        m.push_triangle(d, b, mid);
        m.push_triangle(d, mid, a);
        m
    }

    #[test]
    fn splits_t_vertices_until_edges_pair() {
        let cracked = cracked_sandwich();
        assert!(cracked.boundary_edge_count() > 0);

        let repaired = repair_seams(&cracked, 1e-6);
        assert_eq!(repaired.boundary_edge_count(), 0);
        assert_eq!(repaired.num_triangles(), 6);
        assert!(repaired.signed_volume().abs() < 1e-12);
    }

    #[test]
    fn welds_duplicate_vertices_and_drops_collapsed_faces() {
        let mut m = TriMesh::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = m.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = m.push_vertex(Point3::new(0.0, 1.0, 0.0));
        let a2 = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        m.push_triangle(a, b, c);
        // Collapses once a2 welds onto a.
        m.push_triangle(a2, a, b);

        let repaired = repair_seams(&m, 1e-6);
        assert_eq!(repaired.num_vertices(), 3);
        assert_eq!(repaired.num_triangles(), 1);
    }

    #[test]
    fn leaves_a_clean_mesh_alone() {
        let mut m = TriMesh::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = m.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = m.push_vertex(Point3::new(0.0, 1.0, 0.0));
        let d = m.push_vertex(Point3::new(0.0, 0.0, 1.0));
        m.push_triangle(a, c, b);
        m.push_triangle(a, b, d);
        m.push_triangle(b, c, d);
        m.push_triangle(a, d, c);

        let repaired = repair_seams(&m, 1e-6);
        assert_eq!(repaired.num_triangles(), 4);
        assert_eq!(repaired.boundary_edge_count(), 0);
        assert!((repaired.signed_volume() - m.signed_volume()).abs() < 1e-12);
    }
}
