#![warn(missing_docs)]

//! CSG boolean operations on watertight triangle meshes.
//!
//! Implements union, difference, and intersection via BSP polygon
//! clipping. The pipeline:
//!
//! 1. **Precondition check**: both inputs must be watertight and finite
//! 2. **AABB filter**: non-overlapping operands take a shortcut
//! 3. **BSP clip**: build a tree per operand, clip each against the other
//! 4. **Reassembly**: surviving polygons are fan-triangulated back into
//!    a mesh
//! 5. **Seam repair**: T-vertices left where the operands were split
//!    against different planes are resolved so every edge pairs exactly
//!
//! Union and intersection are commutative; difference is order-sensitive.
//! Degenerate outcomes (empty intersection, full subtraction) are valid
//! empty meshes, never errors. Coincident-surface classification uses the
//! caller's [`Tolerance`] epsilon.

pub mod bbox;
mod bsp;
mod repair;

use chatcad_kernel_math::Tolerance;
use chatcad_kernel_mesh::TriMesh;
use thiserror::Error;

/// CSG boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Union: combine both solids.
    Union,
    /// Difference: subtract the tool from the target.
    Difference,
    /// Intersection: keep only the overlapping region.
    Intersection,
}

/// Failure of the boolean kernel itself.
///
/// These are contract violations or numerical breakdowns; geometric
/// degeneracy (an empty result) is not a failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BooleanError {
    /// An input mesh has boundary edges and cannot be classified.
    #[error("{side} operand is not watertight ({boundary_edges} boundary edges)")]
    InputNotWatertight {
        /// Which operand, "left" or "right".
        side: &'static str,
        /// Number of unmatched edges found.
        boundary_edges: usize,
    },
    /// An input mesh carries non-finite vertex data.
    #[error("{side} operand contains non-finite vertices")]
    InputNotFinite {
        /// Which operand, "left" or "right".
        side: &'static str,
    },
    /// The clipped result lost closure beyond tolerance.
    #[error("result mesh is not robustly closed ({boundary_edges} boundary edges)")]
    ResultNotClosed {
        /// Number of unmatched edges in the output.
        boundary_edges: usize,
    },
    /// The clipped result produced non-finite vertex data.
    #[error("result mesh contains non-finite vertices")]
    ResultNotFinite,
}

fn check_input(mesh: &TriMesh, side: &'static str) -> Result<(), BooleanError> {
    if !mesh.is_finite() {
        return Err(BooleanError::InputNotFinite { side });
    }
    let boundary = mesh.boundary_edge_count();
    if boundary != 0 {
        return Err(BooleanError::InputNotWatertight {
            side,
            boundary_edges: boundary,
        });
    }
    Ok(())
}

/// Perform a CSG boolean operation on two watertight meshes.
///
/// Either operand may be empty: empty is the identity for union, an
/// absorbing element for intersection, and a no-op subtrahend for
/// difference.
pub fn boolean_op(
    a: &TriMesh,
    b: &TriMesh,
    op: BooleanOp,
    tol: Tolerance,
) -> Result<TriMesh, BooleanError> {
    // Null-solid shortcuts.
    if a.is_empty() || b.is_empty() {
        return Ok(match op {
            BooleanOp::Union => {
                let mut m = a.clone();
                m.merge(b);
                m
            }
            BooleanOp::Difference => a.clone(),
            BooleanOp::Intersection => TriMesh::new(),
        });
    }

    check_input(a, "left")?;
    check_input(b, "right")?;

    // Broadphase: disjoint bounds never interact.
    if let (Some(bb_a), Some(bb_b)) = (bbox::Aabb::of_mesh(a), bbox::Aabb::of_mesh(b)) {
        if !bb_a.overlaps(&bb_b, tol.linear) {
            return Ok(match op {
                BooleanOp::Union => {
                    let mut m = a.clone();
                    m.merge(b);
                    m
                }
                BooleanOp::Difference => a.clone(),
                BooleanOp::Intersection => TriMesh::new(),
            });
        }
    }

    let clipped = bsp::clip_boolean(a, b, op, tol.linear);
    let result = repair::repair_seams(&clipped, tol.linear);

    if !result.is_finite() {
        return Err(BooleanError::ResultNotFinite);
    }
    let boundary = result.boundary_edge_count();
    if !result.is_empty() && boundary != 0 {
        return Err(BooleanError::ResultNotClosed {
            boundary_edges: boundary,
        });
    }
    Ok(result)
}
