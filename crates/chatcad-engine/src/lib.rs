#![warn(missing_docs)]

//! Composition engine and model registry for chatcad.
//!
//! Given an [`OperationLog`](chatcad_ops::OperationLog) produced by the
//! reasoning collaborator and the registry from the previous turn,
//! [`CompositionEngine::apply`] realizes primitives, applies transforms,
//! runs boolean combinations, and returns a new registry. Application is
//! pure and turn-atomic: a failed log leaves the input registry untouched.

mod compose;
mod model;
mod registry;

pub use compose::{CompositionEngine, EngineConfig, EngineError};
pub use model::{Model, ModelSummary, Provenance, Source};
pub use registry::ModelRegistry;

use chatcad_export::{export_mesh, ExportError, ExportFormat};
use chatcad_ops::ModelId;
use thiserror::Error;

/// Errors from exporting a registry model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelExportError {
    /// No live model under that identifier.
    #[error("unknown model `{id}`")]
    UnknownModel {
        /// The missing identifier.
        id: ModelId,
    },
    /// The mesh could not be encoded.
    #[error("export of `{id}` failed")]
    Encode {
        /// The model being exported.
        id: ModelId,
        /// Underlying encoder error.
        #[source]
        source: ExportError,
    },
}

/// Encode one registry model in the given format.
pub fn export_model(
    registry: &ModelRegistry,
    id: &str,
    format: ExportFormat,
) -> Result<Vec<u8>, ModelExportError> {
    let model = registry
        .get(id)
        .ok_or_else(|| ModelExportError::UnknownModel { id: id.to_string() })?;
    export_mesh(&model.mesh, format).map_err(|source| ModelExportError::Encode {
        id: id.to_string(),
        source,
    })
}

/// Encode every registry model into one combined mesh, merged in
/// identifier order. Useful for printing a whole assembly at once.
pub fn export_combined(
    registry: &ModelRegistry,
    format: ExportFormat,
) -> Result<Vec<u8>, ModelExportError> {
    let mut combined = chatcad_kernel_mesh::TriMesh::new();
    for id in registry.ids() {
        if let Some(model) = registry.get(&id) {
            combined.merge(&model.mesh);
        }
    }
    export_mesh(&combined, format).map_err(|source| ModelExportError::Encode {
        id: "<combined>".to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatcad_ops::{BoolKind, Operation, OperationLog, Pose, Primitive, Vec3};

    fn create_cuboid(id: &str, w: f64, h: f64, d: f64) -> Operation {
        Operation::CreatePrimitive {
            id: id.to_string(),
            primitive: Primitive::Cuboid {
                width: w,
                height: h,
                depth: d,
                pose: Pose::default(),
            },
        }
    }

    fn apply(log: &OperationLog) -> Result<ModelRegistry, EngineError> {
        CompositionEngine::new().apply(log, &ModelRegistry::new())
    }

    #[test]
    fn create_unit_cube() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        let reg = apply(&log).unwrap();
        assert_eq!(reg.ids(), vec!["A"]);
        let model = reg.get("A").unwrap();
        assert!(model.mesh.is_watertight());
        assert!((model.mesh.volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn union_consumes_operands() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(Operation::CreatePrimitive {
            id: "B".to_string(),
            primitive: Primitive::EllipticCylinder {
                radius_x: 1.0,
                radius_y: 1.0,
                height: 2.0,
                segments: 32,
                pose: Pose::default(),
            },
        });
        log.push(Operation::BooleanCombine {
            left: "A".to_string(),
            right: "B".to_string(),
            op: BoolKind::Union,
            result: "C".to_string(),
        });
        let reg = apply(&log).unwrap();
        assert_eq!(reg.ids(), vec!["C"]);
        let c = reg.get("C").unwrap();
        assert!(c.mesh.is_watertight());
        let bound = 1.0 + std::f64::consts::PI * 2.0;
        assert!(c.mesh.volume() <= bound);
        assert!(matches!(
            c.provenance.source,
            Source::Boolean {
                op: BoolKind::Union,
                ..
            }
        ));
    }

    #[test]
    fn scale_grows_bounding_box_and_updates_provenance() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(Operation::Scale {
            id: "A".to_string(),
            factor: Vec3::splat(1.5),
        });
        let reg = apply(&log).unwrap();
        let model = reg.get("A").unwrap();
        let (min, max) = model.mesh.bounding_box().unwrap();
        assert!((max.x - min.x - 1.5).abs() < 1e-12);
        assert_eq!(model.provenance.transforms, vec!["scale"]);
    }

    #[test]
    fn unknown_operand_leaves_base_untouched() {
        let mut setup = OperationLog::new();
        setup.push(create_cuboid("A", 1.0, 1.0, 1.0));
        let base = apply(&setup).unwrap();

        let mut bad = OperationLog::new();
        bad.push(Operation::BooleanCombine {
            left: "A".to_string(),
            right: "ghost".to_string(),
            op: BoolKind::Difference,
            result: "D".to_string(),
        });
        let err = CompositionEngine::new().apply(&bad, &base).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownModel {
                index: 0,
                id: "ghost".to_string()
            }
        );
        // Atomicity: the base registry still holds exactly "A".
        assert_eq!(base.ids(), vec!["A"]);
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(create_cuboid("A", 2.0, 2.0, 2.0));
        let err = apply(&log).unwrap_err();
        assert_eq!(
            err,
            EngineError::DuplicateIdentifier {
                index: 1,
                id: "A".to_string()
            }
        );
    }

    #[test]
    fn boolean_result_may_reuse_operand_id() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 2.0, 2.0, 2.0));
        log.push(create_cuboid("B", 1.0, 1.0, 1.0));
        log.push(Operation::BooleanCombine {
            left: "A".to_string(),
            right: "B".to_string(),
            op: BoolKind::Difference,
            result: "A".to_string(),
        });
        let reg = apply(&log).unwrap();
        assert_eq!(reg.ids(), vec!["A"]);
        let model = reg.get("A").unwrap();
        assert!((model.mesh.volume() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn boolean_result_must_not_clobber_bystander() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(create_cuboid("B", 1.0, 1.0, 1.0));
        log.push(create_cuboid("C", 1.0, 1.0, 1.0));
        log.push(Operation::BooleanCombine {
            left: "A".to_string(),
            right: "B".to_string(),
            op: BoolKind::Union,
            result: "C".to_string(),
        });
        let err = apply(&log).unwrap_err();
        assert_eq!(
            err,
            EngineError::DuplicateIdentifier {
                index: 3,
                id: "C".to_string()
            }
        );
    }

    #[test]
    fn invalid_primitive_reports_its_index() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(create_cuboid("B", -1.0, 1.0, 1.0));
        let err = apply(&log).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter { index: 1, ref name, .. } if name == "width"
        ));
    }

    #[test]
    fn translate_moves_origin_with_model() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(Operation::Translate {
            id: "A".to_string(),
            offset: Vec3::new(3.0, 0.0, 0.0),
        });
        // Rotation after translation spins in place about the moved
        // origin, it does not orbit the world origin.
        log.push(Operation::Rotate {
            id: "A".to_string(),
            angles: Vec3::new(0.0, 0.0, 90.0),
            pivot: None,
        });
        let reg = apply(&log).unwrap();
        let model = reg.get("A").unwrap();
        let (min, max) = model.mesh.bounding_box().unwrap();
        let center_x = (min.x + max.x) / 2.0;
        assert!((center_x - 3.0).abs() < 1e-9);
        assert_eq!(model.provenance.transforms, vec!["translate", "rotate"]);
    }

    #[test]
    fn rotate_about_explicit_pivot_orbits() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(Operation::Translate {
            id: "A".to_string(),
            offset: Vec3::new(2.0, 0.0, 0.0),
        });
        log.push(Operation::Rotate {
            id: "A".to_string(),
            angles: Vec3::new(0.0, 0.0, 180.0),
            pivot: Some(Vec3::zero()),
        });
        let reg = apply(&log).unwrap();
        let model = reg.get("A").unwrap();
        let (min, max) = model.mesh.bounding_box().unwrap();
        let center_x = (min.x + max.x) / 2.0;
        assert!((center_x + 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_scale_factor_is_invalid() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(Operation::Scale {
            id: "A".to_string(),
            factor: Vec3::new(1.0, 0.0, 1.0),
        });
        let err = apply(&log).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter { index: 1, ref name, .. } if name == "factor"
        ));
    }

    #[test]
    fn apply_is_pure() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(Operation::Rotate {
            id: "A".to_string(),
            angles: Vec3::new(15.0, 30.0, 45.0),
            pivot: None,
        });
        let engine = CompositionEngine::new();
        let base = ModelRegistry::new();
        let first = engine.apply(&log, &base).unwrap();
        let second = engine.apply(&log, &base).unwrap();
        assert_eq!(
            first.get("A").unwrap().mesh,
            second.get("A").unwrap().mesh
        );
        assert!(base.is_empty());
    }

    #[test]
    fn parallel_and_sequential_realization_agree() {
        let mut log = OperationLog::new();
        for i in 0..6 {
            log.push(create_cuboid(&format!("m{i}"), 1.0 + i as f64, 1.0, 1.0));
        }
        let par = CompositionEngine::with_config(EngineConfig {
            parallel: true,
            ..EngineConfig::default()
        })
        .apply(&log, &ModelRegistry::new())
        .unwrap();
        let seq = CompositionEngine::with_config(EngineConfig {
            parallel: false,
            ..EngineConfig::default()
        })
        .apply(&log, &ModelRegistry::new())
        .unwrap();
        assert_eq!(par.ids(), seq.ids());
        for id in par.ids() {
            assert_eq!(par.get(&id).unwrap().mesh, seq.get(&id).unwrap().mesh);
        }
    }

    #[test]
    fn summaries_feed_back_geometry() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 2.0, 1.0, 1.0));
        let reg = apply(&log).unwrap();
        let summaries = reg.summaries();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.id, "A");
        assert_eq!(s.kind, "cuboid");
        assert!((s.volume - 2.0).abs() < 1e-12);
        let bb = s.bounding_box.unwrap();
        assert_eq!(bb[0], [-1.0, -0.5, -0.5]);
        // Summaries serialize for the planner payload.
        let json = serde_json::to_string(&summaries).unwrap();
        assert!(json.contains(r#""kind":"cuboid""#));
    }

    #[test]
    fn export_model_by_id() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        let reg = apply(&log).unwrap();
        let stl = export_model(&reg, "A", ExportFormat::Stl).unwrap();
        assert_eq!(stl.len(), 84 + 12 * 50);
        let missing = export_model(&reg, "nope", ExportFormat::Stl);
        assert!(matches!(
            missing,
            Err(ModelExportError::UnknownModel { .. })
        ));
    }

    #[test]
    fn export_combined_merges_all_models() {
        let mut log = OperationLog::new();
        log.push(create_cuboid("A", 1.0, 1.0, 1.0));
        log.push(Operation::CreatePrimitive {
            id: "B".to_string(),
            primitive: Primitive::Cuboid {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
                pose: Pose {
                    position: Some(Vec3::new(5.0, 0.0, 0.0)),
                    ..Pose::default()
                },
            },
        });
        let reg = apply(&log).unwrap();
        let stl = export_combined(&reg, ExportFormat::Stl).unwrap();
        assert_eq!(stl.len(), 84 + 24 * 50);
    }
}
