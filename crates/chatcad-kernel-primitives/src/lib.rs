#![warn(missing_docs)]

//! Watertight primitive mesh construction for the chatcad kernel.
//!
//! Realizes the four base solids of the operation IR (cuboid, elliptic
//! cylinder, half cylinder, NACA-4 airfoil extrusion) as watertight
//! triangle meshes. All solids are generated centered at the local origin,
//! then transformed by the primitive's pose.
//!
//! Defaults: 32 cross-section segments for cylinders, 50 chordwise sample
//! stations for airfoils; the floor for both is 8.

use chatcad_kernel_math::{Point3, Transform};
use chatcad_kernel_mesh::TriMesh;
use chatcad_ops::{Pose, Primitive};
use std::f64::consts::PI;
use thiserror::Error;

mod naca;
mod profile;

pub use naca::naca4_profile;

/// Default segment count for cylindrical cross-sections.
pub const DEFAULT_SEGMENTS: u32 = 32;
/// Default chordwise sample count for airfoil profiles.
pub const DEFAULT_SAMPLES: u32 = 50;
/// Minimum resolution below which a cross-section is rejected as degenerate.
pub const MIN_RESOLUTION: u32 = 8;

/// Errors from primitive realization. Local to the offending primitive;
/// never touches any registry state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrimitiveError {
    /// A parameter is malformed or out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> PrimitiveError {
    PrimitiveError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), PrimitiveError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, format!("must be positive, got {value}")))
    }
}

fn resolve_resolution(name: &'static str, requested: u32, default: u32) -> Result<u32, PrimitiveError> {
    let n = if requested == 0 { default } else { requested };
    if n < MIN_RESOLUTION {
        Err(invalid(
            name,
            format!("must be at least {MIN_RESOLUTION}, got {n}"),
        ))
    } else {
        Ok(n)
    }
}

/// Realize a primitive into a watertight mesh. Deterministic and
/// side-effect-free.
pub fn realize(primitive: &Primitive) -> Result<TriMesh, PrimitiveError> {
    let mut mesh = match primitive {
        Primitive::Cuboid {
            width,
            height,
            depth,
            ..
        } => cuboid(*width, *height, *depth)?,
        Primitive::EllipticCylinder {
            radius_x,
            radius_y,
            height,
            segments,
            ..
        } => elliptic_cylinder(*radius_x, *radius_y, *height, *segments)?,
        Primitive::HalfCylinder {
            radius,
            height,
            segments,
            ..
        } => half_cylinder(*radius, *height, *segments)?,
        Primitive::AirfoilExtrusion {
            naca_code,
            chord_length,
            span,
            samples,
            ..
        } => airfoil_extrusion(naca_code, *chord_length, *span, *samples)?,
    };
    apply_pose(&mut mesh, primitive.pose());
    Ok(mesh)
}

fn apply_pose(mesh: &mut TriMesh, pose: &Pose) {
    if pose.is_identity() {
        return;
    }
    let rot = Transform::euler_deg(pose.pitch, pose.yaw, pose.roll);
    let t = match pose.position {
        Some(p) => Transform::translation(p.x, p.y, p.z).then(&rot),
        None => rot,
    };
    mesh.transform(&t);
}

/// Build an axis-aligned box centered at origin.
///
/// Vertex layout (centered, half-extents `hx/hy/hz`):
/// ```text
///     v4----v5
///    /|    /|
///   v7----v6|    z
///   | v0--|-v1   | y
///   |/    |/     |/
///   v3----v2     +---x
/// ```
pub fn cuboid(width: f64, height: f64, depth: f64) -> Result<TriMesh, PrimitiveError> {
    require_positive("width", width)?;
    require_positive("height", height)?;
    require_positive("depth", depth)?;

    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
    let mut mesh = TriMesh::new();
    let corners = [
        Point3::new(-hx, -hy, -hz),
        Point3::new(hx, -hy, -hz),
        Point3::new(hx, hy, -hz),
        Point3::new(-hx, hy, -hz),
        Point3::new(-hx, -hy, hz),
        Point3::new(hx, -hy, hz),
        Point3::new(hx, hy, hz),
        Point3::new(-hx, hy, hz),
    ];
    for c in corners {
        mesh.push_vertex(c);
    }
    // Quads in CCW order viewed from outside.
    let faces: [[u32; 4]; 6] = [
        [0, 3, 2, 1], // bottom (-Z)
        [4, 5, 6, 7], // top (+Z)
        [0, 1, 5, 4], // front (-Y)
        [2, 3, 7, 6], // back (+Y)
        [0, 4, 7, 3], // left (-X)
        [1, 2, 6, 5], // right (+X)
    ];
    for [a, b, c, d] in faces {
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }
    Ok(mesh)
}

/// Build an elliptical cylinder along Z, centered at origin.
pub fn elliptic_cylinder(
    radius_x: f64,
    radius_y: f64,
    height: f64,
    segments: u32,
) -> Result<TriMesh, PrimitiveError> {
    require_positive("radius_x", radius_x)?;
    require_positive("radius_y", radius_y)?;
    require_positive("height", height)?;
    let n = resolve_resolution("segments", segments, DEFAULT_SEGMENTS)? as usize;

    let ring: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / n as f64;
            (radius_x * theta.cos(), radius_y * theta.sin())
        })
        .collect();
    Ok(profile::extrude_polygon(&ring, height))
}

/// Build a half cylinder along Z: half-disk cross-section over [0, π],
/// flat face on the y = 0 plane, centered at origin.
pub fn half_cylinder(radius: f64, height: f64, segments: u32) -> Result<TriMesh, PrimitiveError> {
    require_positive("radius", radius)?;
    require_positive("height", height)?;
    let n = resolve_resolution("segments", segments, DEFAULT_SEGMENTS)? as usize;

    // Arc from (r, 0) to (-r, 0); the closing polygon edge is the flat
    // diameter chord.
    let profile: Vec<(f64, f64)> = (0..=n)
        .map(|i| {
            let theta = PI * i as f64 / n as f64;
            (radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    Ok(profile::extrude_polygon(&profile, height))
}

/// Build a NACA 4-digit airfoil solid: the closed profile sampled at
/// `samples` chordwise stations, extruded along the span.
///
/// Chord runs along +X (centered), span along +Y (centered), thickness
/// along +Z.
pub fn airfoil_extrusion(
    naca_code: &str,
    chord_length: f64,
    span: f64,
    samples: u32,
) -> Result<TriMesh, PrimitiveError> {
    require_positive("chord_length", chord_length)?;
    require_positive("span", span)?;
    let n = resolve_resolution("samples", samples, DEFAULT_SAMPLES)? as usize;
    let profile = naca::naca4_profile(naca_code, chord_length, n)?;

    // The profile lives in the chord/thickness plane. Extrude along Z,
    // then stand the prism up so the span runs along Y.
    let mut mesh = profile::extrude_polygon(&profile, span);
    mesh.transform(&Transform::rotation_x(PI / 2.0));
    // Center the chord on the origin.
    mesh.transform(&Transform::translation(-chord_length / 2.0, 0.0, 0.0));
    Ok(mesh)
}
