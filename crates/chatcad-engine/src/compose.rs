//! The composition engine: turning an operation log into registry state.
//!
//! `apply` is a pure function from (log, registry) to a new registry.
//! The input registry is never mutated; callers commit the returned
//! registry only on success, so a failing turn leaves the session exactly
//! where it was.

use crate::model::{Model, Provenance};
use crate::registry::ModelRegistry;
use chatcad_kernel_booleans::{boolean_op, BooleanError, BooleanOp};
use chatcad_kernel_math::{Point3, Tolerance, Transform};
use chatcad_kernel_mesh::TriMesh;
use chatcad_kernel_primitives::{realize, PrimitiveError};
use chatcad_ops::{BoolKind, ModelId, Operation, OperationLog, Primitive, Vec3};
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while applying an operation log. Every variant carries
/// the zero-based index of the offending operation so the failure can be
/// reported back to the reasoning collaborator precisely.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// An operation parameter is malformed or out of range.
    #[error("operation {index}: invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Index of the failing operation in the log.
        index: usize,
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// An operation referenced an identifier with no live model.
    #[error("operation {index}: unknown model `{id}`")]
    UnknownModel {
        /// Index of the failing operation in the log.
        index: usize,
        /// The missing identifier.
        id: ModelId,
    },
    /// A create or combine would clobber a live model it does not consume.
    #[error("operation {index}: duplicate identifier `{id}`")]
    DuplicateIdentifier {
        /// Index of the failing operation in the log.
        index: usize,
        /// The colliding identifier.
        id: ModelId,
    },
    /// The boolean kernel rejected the combination.
    #[error("operation {index}: boolean {op:?} of `{left}` and `{right}` failed")]
    BooleanFailure {
        /// Index of the failing operation in the log.
        index: usize,
        /// Left operand identifier.
        left: ModelId,
        /// Right operand identifier.
        right: ModelId,
        /// The boolean operator.
        op: BoolKind,
        /// Underlying kernel error.
        #[source]
        source: BooleanError,
    },
}

/// Composition engine settings.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Geometric tolerance for the boolean kernel.
    pub tolerance: Tolerance,
    /// Realize independent primitives on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            parallel: true,
        }
    }
}

/// Applies operation logs to registries.
#[derive(Debug, Clone, Default)]
pub struct CompositionEngine {
    config: EngineConfig,
}

impl CompositionEngine {
    /// Engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit settings.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Apply `log` to a copy of `base`, returning the new registry.
    ///
    /// Operations take effect in log order. On the first error the whole
    /// turn is discarded and `base` is untouched.
    pub fn apply(
        &self,
        log: &OperationLog,
        base: &ModelRegistry,
    ) -> Result<ModelRegistry, EngineError> {
        let mut realized = self.realize_primitives(log);
        let mut registry = base.clone();

        for (index, op) in log.operations.iter().enumerate() {
            debug!(index, op = ?op, "applying operation");
            match op {
                Operation::CreatePrimitive { id, primitive } => {
                    if registry.contains(id) {
                        return Err(EngineError::DuplicateIdentifier {
                            index,
                            id: id.clone(),
                        });
                    }
                    let mesh = match realized.remove(&index) {
                        Some(result) => result.map_err(|e| invalid(index, e))?,
                        None => realize(primitive).map_err(|e| invalid(index, e))?,
                    };
                    let origin = primitive
                        .pose()
                        .position
                        .map(to_point)
                        .unwrap_or_else(Point3::origin);
                    registry.insert(Model {
                        id: id.clone(),
                        mesh,
                        origin,
                        provenance: Provenance::primitive(primitive.kind()),
                    });
                }
                Operation::Translate { id, offset } => {
                    check_finite(index, "offset", offset)?;
                    let model = lookup(&registry, index, id)?;
                    let t = Transform::translation(offset.x, offset.y, offset.z);
                    let moved = Model {
                        id: id.clone(),
                        mesh: model.mesh.transformed(&t),
                        origin: t.apply_point(&model.origin),
                        provenance: model.provenance.with_transform("translate"),
                    };
                    registry.insert(moved);
                }
                Operation::Rotate { id, angles, pivot } => {
                    check_finite(index, "angles", angles)?;
                    let model = lookup(&registry, index, id)?;
                    let rotation = Transform::euler_deg(angles.x, angles.y, angles.z);
                    let center = pivot.map(to_point).unwrap_or(model.origin);
                    let t = Transform::rotation_about_point(&rotation, &center);
                    let rotated = Model {
                        id: id.clone(),
                        mesh: model.mesh.transformed(&t),
                        origin: t.apply_point(&model.origin),
                        provenance: model.provenance.with_transform("rotate"),
                    };
                    registry.insert(rotated);
                }
                Operation::Scale { id, factor } => {
                    check_finite(index, "factor", factor)?;
                    if factor.x == 0.0 || factor.y == 0.0 || factor.z == 0.0 {
                        return Err(EngineError::InvalidParameter {
                            index,
                            name: "factor".to_string(),
                            reason: "scale factor must be nonzero".to_string(),
                        });
                    }
                    let model = lookup(&registry, index, id)?;
                    let t = Transform::scale_about_point(
                        factor.x,
                        factor.y,
                        factor.z,
                        &model.origin,
                    );
                    let scaled = Model {
                        id: id.clone(),
                        mesh: model.mesh.transformed(&t),
                        origin: model.origin,
                        provenance: model.provenance.with_transform("scale"),
                    };
                    registry.insert(scaled);
                }
                Operation::BooleanCombine {
                    left,
                    right,
                    op,
                    result,
                } => {
                    let lhs = lookup(&registry, index, left)?;
                    let rhs = lookup(&registry, index, right)?;
                    if registry.contains(result) && result != left && result != right {
                        return Err(EngineError::DuplicateIdentifier {
                            index,
                            id: result.clone(),
                        });
                    }
                    let mesh = boolean_op(&lhs.mesh, &rhs.mesh, to_kernel_op(*op), self.config.tolerance)
                        .map_err(|source| EngineError::BooleanFailure {
                            index,
                            left: left.clone(),
                            right: right.clone(),
                            op: *op,
                            source,
                        })?;
                    let origin = lhs.origin;
                    // Operands are consumed by the combination.
                    registry.remove(left);
                    registry.remove(right);
                    registry.insert(Model {
                        id: result.clone(),
                        mesh,
                        origin,
                        provenance: Provenance::boolean(*op, left.clone(), right.clone()),
                    });
                }
            }
        }

        info!(
            operations = log.len(),
            models = registry.len(),
            "operation log applied"
        );
        Ok(registry)
    }

    /// Realize every primitive in the log up front. Creation is
    /// independent of registry state, so the meshes can be built on the
    /// rayon pool; errors are deferred to the sequential walk so the
    /// first failing operation in log order is the one reported.
    fn realize_primitives(
        &self,
        log: &OperationLog,
    ) -> HashMap<usize, Result<TriMesh, PrimitiveError>> {
        let creations: Vec<(usize, &Primitive)> = log
            .operations
            .iter()
            .enumerate()
            .filter_map(|(i, op)| match op {
                Operation::CreatePrimitive { primitive, .. } => Some((i, primitive)),
                _ => None,
            })
            .collect();
        if self.config.parallel && creations.len() > 1 {
            creations
                .into_par_iter()
                .map(|(i, p)| (i, realize(p)))
                .collect()
        } else {
            creations.into_iter().map(|(i, p)| (i, realize(p))).collect()
        }
    }
}

fn invalid(index: usize, err: PrimitiveError) -> EngineError {
    let PrimitiveError::InvalidParameter { name, reason } = err;
    EngineError::InvalidParameter {
        index,
        name: name.to_string(),
        reason,
    }
}

fn lookup(
    registry: &ModelRegistry,
    index: usize,
    id: &str,
) -> Result<std::sync::Arc<Model>, EngineError> {
    registry
        .get(id)
        .cloned()
        .ok_or_else(|| EngineError::UnknownModel {
            index,
            id: id.to_string(),
        })
}

fn check_finite(index: usize, name: &str, v: &Vec3) -> Result<(), EngineError> {
    if v.x.is_finite() && v.y.is_finite() && v.z.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter {
            index,
            name: name.to_string(),
            reason: "components must be finite".to_string(),
        })
    }
}

fn to_point(v: Vec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

fn to_kernel_op(kind: BoolKind) -> BooleanOp {
    match kind {
        BoolKind::Union => BooleanOp::Union,
        BoolKind::Intersection => BooleanOp::Intersection,
        BoolKind::Difference => BooleanOp::Difference,
    }
}
