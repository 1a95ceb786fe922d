//! 2D profile extrusion: turn a simple CCW polygon into a watertight prism.
//!
//! Caps are triangulated by ear clipping so non-convex profiles (cambered
//! airfoils) tessellate correctly.

use chatcad_kernel_math::Point3;
use chatcad_kernel_mesh::TriMesh;

/// Extrude a simple CCW polygon in the XY plane along Z, centered on z = 0.
///
/// Produces one bottom ring, one top ring, side walls with outward
/// normals, and ear-clipped caps. The polygon must not repeat its first
/// vertex at the end.
pub fn extrude_polygon(polygon: &[(f64, f64)], height: f64) -> TriMesh {
    let n = polygon.len();
    debug_assert!(n >= 3, "polygon needs at least 3 vertices");
    let hz = height / 2.0;

    let mut mesh = TriMesh::new();
    for &(x, y) in polygon {
        mesh.push_vertex(Point3::new(x, y, -hz));
    }
    for &(x, y) in polygon {
        mesh.push_vertex(Point3::new(x, y, hz));
    }
    let top = n as u32;

    // Side walls. For a CCW profile, (b_i, b_j, t_j), (b_i, t_j, t_i)
    // winds outward.
    for i in 0..n {
        let j = (i + 1) % n;
        let (bi, bj) = (i as u32, j as u32);
        let (ti, tj) = (top + i as u32, top + j as u32);
        mesh.push_triangle(bi, bj, tj);
        mesh.push_triangle(bi, tj, ti);
    }

    // Caps: CCW triangles face +Z, so the top cap uses them directly and
    // the bottom cap reverses.
    for [a, b, c] in triangulate(polygon) {
        mesh.push_triangle(top + a as u32, top + b as u32, top + c as u32);
        mesh.push_triangle(a as u32, c as u32, b as u32);
    }
    mesh
}

/// Ear-clipping triangulation of a simple CCW polygon. Returns index
/// triples into the input slice.
pub fn triangulate(polygon: &[(f64, f64)]) -> Vec<[usize; 3]> {
    let n = polygon.len();
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n.saturating_sub(2));

    while remaining.len() > 3 {
        let m = remaining.len();
        let mut clipped = false;
        for k in 0..m {
            let ia = remaining[(k + m - 1) % m];
            let ib = remaining[k];
            let ic = remaining[(k + 1) % m];
            if !is_ear(polygon, &remaining, ia, ib, ic) {
                continue;
            }
            triangles.push([ia, ib, ic]);
            remaining.remove(k);
            clipped = true;
            break;
        }
        if !clipped {
            // Numerically stuck (collinear runs). Fall back to clipping
            // the first vertex; the census downstream will flag a genuine
            // failure.
            let ia = remaining[remaining.len() - 1];
            let ib = remaining[0];
            let ic = remaining[1];
            triangles.push([ia, ib, ic]);
            remaining.remove(0);
        }
    }
    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

fn cross2(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn is_ear(polygon: &[(f64, f64)], remaining: &[usize], ia: usize, ib: usize, ic: usize) -> bool {
    let (a, b, c) = (polygon[ia], polygon[ib], polygon[ic]);
    // Convex corner for a CCW polygon.
    if cross2(a, b, c) <= 0.0 {
        return false;
    }
    // No other remaining vertex may lie inside the candidate ear.
    for &i in remaining {
        if i == ia || i == ib || i == ic {
            continue;
        }
        let p = polygon[i];
        if cross2(a, b, p) >= 0.0 && cross2(b, c, p) >= 0.0 && cross2(c, a, p) >= 0.0 {
            return false;
        }
    }
    true
}
