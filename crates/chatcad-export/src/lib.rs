#![warn(missing_docs)]

//! Mesh export encoders for chatcad.
//!
//! Turns a [`TriMesh`] into a downloadable byte stream. Solid formats
//! (STL, PLY) require a watertight mesh; OBJ merely requires a valid one.
//! Every format rejects non-finite vertices and degenerate faces; the
//! engine only hands over internally consistent geometry.

use chatcad_kernel_mesh::TriMesh;
use std::fmt::Write as _;
use thiserror::Error;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Binary STL (solid; watertight required).
    Stl,
    /// Wavefront OBJ (surface; open meshes allowed).
    Obj,
    /// ASCII PLY (solid; watertight required).
    Ply,
}

impl ExportFormat {
    /// Parse from a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            "ply" => Some(Self::Ply),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Ply => "ply",
        }
    }
}

/// Errors from mesh export.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    /// Solid formats need a closed mesh.
    #[error("{format} export requires a watertight mesh ({boundary_edges} boundary edges)")]
    NotWatertight {
        /// Format that was requested.
        format: &'static str,
        /// Number of boundary edges found.
        boundary_edges: usize,
    },
    /// The mesh carries NaN or infinite vertex coordinates.
    #[error("mesh contains non-finite vertices")]
    NonFiniteVertices,
    /// The mesh contains zero-area faces.
    #[error("mesh contains {count} degenerate faces")]
    DegenerateFaces {
        /// How many were found.
        count: usize,
    },
    /// There is nothing to export.
    #[error("mesh is empty")]
    EmptyMesh,
}

const DEGENERATE_AREA_EPS: f64 = 1e-12;

fn check_mesh(mesh: &TriMesh, format: ExportFormat) -> Result<(), ExportError> {
    if mesh.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    if !mesh.is_finite() {
        return Err(ExportError::NonFiniteVertices);
    }
    let degenerate = mesh.degenerate_face_count(DEGENERATE_AREA_EPS);
    if degenerate > 0 {
        return Err(ExportError::DegenerateFaces { count: degenerate });
    }
    if matches!(format, ExportFormat::Stl | ExportFormat::Ply) {
        let boundary = mesh.boundary_edge_count();
        if boundary != 0 {
            return Err(ExportError::NotWatertight {
                format: format.extension(),
                boundary_edges: boundary,
            });
        }
    }
    Ok(())
}

/// Encode a mesh in the given format.
pub fn export_mesh(mesh: &TriMesh, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    check_mesh(mesh, format)?;
    Ok(match format {
        ExportFormat::Stl => to_stl_bytes(mesh),
        ExportFormat::Obj => to_obj_bytes(mesh),
        ExportFormat::Ply => to_ply_bytes(mesh),
    })
}

/// Binary STL: 80-byte header, u32 triangle count, then 50 bytes per
/// triangle (normal, three vertices, attribute count), little-endian f32.
fn to_stl_bytes(mesh: &TriMesh) -> Vec<u8> {
    let tri_count = mesh.num_triangles();
    let mut bytes = Vec::with_capacity(84 + tri_count * 50);

    let mut header = [0u8; 80];
    let tag = b"chatcad binary stl";
    header[..tag.len()].copy_from_slice(tag);
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for t in 0..tri_count {
        let [v0, v1, v2] = mesh.triangle(t);
        let n = (v1 - v0).cross(&(v2 - v0));
        let n = if n.norm() > 0.0 { n.normalize() } else { n };
        for val in [n.x, n.y, n.z] {
            bytes.extend_from_slice(&(val as f32).to_le_bytes());
        }
        for v in [v0, v1, v2] {
            for val in [v.x, v.y, v.z] {
                bytes.extend_from_slice(&(val as f32).to_le_bytes());
            }
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
    }
    bytes
}

fn to_obj_bytes(mesh: &TriMesh) -> Vec<u8> {
    let mut out = String::new();
    let _ = writeln!(out, "# chatcad OBJ export");
    for chunk in mesh.vertices.chunks(3) {
        let _ = writeln!(out, "v {} {} {}", chunk[0], chunk[1], chunk[2]);
    }
    // OBJ indices are 1-based.
    for tri in mesh.indices.chunks(3) {
        let _ = writeln!(out, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1);
    }
    out.into_bytes()
}

fn to_ply_bytes(mesh: &TriMesh) -> Vec<u8> {
    let mut out = String::new();
    let _ = writeln!(out, "ply");
    let _ = writeln!(out, "format ascii 1.0");
    let _ = writeln!(out, "comment chatcad PLY export");
    let _ = writeln!(out, "element vertex {}", mesh.num_vertices());
    let _ = writeln!(out, "property float x");
    let _ = writeln!(out, "property float y");
    let _ = writeln!(out, "property float z");
    let _ = writeln!(out, "element face {}", mesh.num_triangles());
    let _ = writeln!(out, "property list uchar int vertex_indices");
    let _ = writeln!(out, "end_header");
    for chunk in mesh.vertices.chunks(3) {
        let _ = writeln!(out, "{} {} {}", chunk[0], chunk[1], chunk[2]);
    }
    for tri in mesh.indices.chunks(3) {
        let _ = writeln!(out, "3 {} {} {}", tri[0], tri[1], tri[2]);
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatcad_kernel_math::Point3;

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

    fn open_triangle() -> TriMesh {
        let mut m = TriMesh::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = m.push_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = m.push_vertex(Point3::new(0.0, 1.0, 0.0));
        m.push_triangle(a, b, c);
        m
    }

    #[test]
    fn stl_layout() {
        let bytes = export_mesh(&tetrahedron(), ExportFormat::Stl).unwrap();
        assert_eq!(bytes.len(), 84 + 4 * 50);
        let count = u32::from_le_bytes(bytes[80..84].try_into().unwrap());
        assert_eq!(count, 4);
        assert!(bytes.starts_with(b"chatcad binary stl"));
    }

    #[test]
    fn obj_is_one_based() {
        let bytes = export_mesh(&open_triangle(), ExportFormat::Obj).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("v 0 0 0"));
        assert!(text.contains("f 1 2 3"));
    }

    #[test]
    fn ply_header() {
        let bytes = export_mesh(&tetrahedron(), ExportFormat::Ply).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("element vertex 4"));
        assert!(text.contains("element face 4"));
    }

    #[test]
    fn solid_formats_require_watertight() {
        let open = open_triangle();
        assert!(matches!(
            export_mesh(&open, ExportFormat::Stl),
            Err(ExportError::NotWatertight { format: "stl", .. })
        ));
        assert!(matches!(
            export_mesh(&open, ExportFormat::Ply),
            Err(ExportError::NotWatertight { format: "ply", .. })
        ));
        // OBJ accepts open surfaces.
        assert!(export_mesh(&open, ExportFormat::Obj).is_ok());
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut nan = open_triangle();
        nan.vertices[0] = f64::NAN;
        assert_eq!(
            export_mesh(&nan, ExportFormat::Obj),
            Err(ExportError::NonFiniteVertices)
        );

        let mut degen = open_triangle();
        degen.push_triangle(0, 0, 1);
        assert!(matches!(
            export_mesh(&degen, ExportFormat::Obj),
            Err(ExportError::DegenerateFaces { count: 1 })
        ));

        assert_eq!(
            export_mesh(&TriMesh::new(), ExportFormat::Stl),
            Err(ExportError::EmptyMesh)
        );
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_extension("STL"), Some(ExportFormat::Stl));
        assert_eq!(ExportFormat::from_extension("obj"), Some(ExportFormat::Obj));
        assert_eq!(ExportFormat::from_extension("gltf"), None);
    }
}
