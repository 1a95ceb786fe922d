//! Registry entries: an immutable mesh plus how it came to be.

use chatcad_kernel_math::Point3;
use chatcad_kernel_mesh::TriMesh;
use chatcad_ops::{BoolKind, ModelId};
use serde::Serialize;

/// How a model entered the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Source {
    /// Realized from a parametric primitive.
    Primitive {
        /// Primitive kind name, e.g. "cuboid".
        kind: String,
    },
    /// Produced by a boolean combination of two earlier models.
    Boolean {
        /// The boolean operator.
        op: BoolKind,
        /// Left operand identifier at combination time.
        left: ModelId,
        /// Right operand identifier at combination time.
        right: ModelId,
    },
}

/// Construction history of a model: its source plus every transform
/// applied since, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    /// Where the model came from.
    pub source: Source,
    /// Transform tags applied after creation ("translate", "rotate",
    /// "scale").
    pub transforms: Vec<String>,
}

impl Provenance {
    /// Provenance for a freshly realized primitive.
    pub fn primitive(kind: &str) -> Self {
        Self {
            source: Source::Primitive {
                kind: kind.to_string(),
            },
            transforms: Vec::new(),
        }
    }

    /// Provenance for a boolean result.
    pub fn boolean(op: BoolKind, left: ModelId, right: ModelId) -> Self {
        Self {
            source: Source::Boolean { op, left, right },
            transforms: Vec::new(),
        }
    }

    /// Copy with one more transform tag appended.
    pub fn with_transform(&self, tag: &str) -> Self {
        let mut out = self.clone();
        out.transforms.push(tag.to_string());
        out
    }
}

/// A named solid in the registry. Immutable once inserted; every edit
/// produces a fresh `Model` under the same or a new identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Stable identifier.
    pub id: ModelId,
    /// Realized triangle mesh.
    pub mesh: TriMesh,
    /// Local origin, the default pivot for rotation and scaling. Moves
    /// with the model under translation.
    pub origin: Point3,
    /// Construction history.
    pub provenance: Provenance,
}

/// Compact description of a model, fed back to the reasoning
/// collaborator so follow-up turns can reference existing geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    /// Model identifier.
    pub id: ModelId,
    /// Source kind: a primitive name or "boolean".
    pub kind: String,
    /// Triangle count of the realized mesh.
    pub triangles: usize,
    /// Axis-aligned bounds as `[min, max]`, absent for a null solid.
    pub bounding_box: Option<[[f64; 3]; 2]>,
    /// Enclosed volume.
    pub volume: f64,
}

impl Model {
    /// Summarize for planner feedback.
    pub fn summary(&self) -> ModelSummary {
        let kind = match &self.provenance.source {
            Source::Primitive { kind } => kind.clone(),
            Source::Boolean { .. } => "boolean".to_string(),
        };
        ModelSummary {
            id: self.id.clone(),
            kind,
            triangles: self.mesh.num_triangles(),
            bounding_box: self
                .mesh
                .bounding_box()
                .map(|(min, max)| [[min.x, min.y, min.z], [max.x, max.y, max.z]]),
            volume: self.mesh.volume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_accumulates_transforms() {
        let p = Provenance::primitive("cuboid")
            .with_transform("translate")
            .with_transform("scale");
        assert_eq!(p.transforms, vec!["translate", "scale"]);
        assert!(matches!(p.source, Source::Primitive { ref kind } if kind == "cuboid"));
    }

    #[test]
    fn summary_of_empty_mesh() {
        let model = Model {
            id: "hole".to_string(),
            mesh: TriMesh::new(),
            origin: Point3::origin(),
            provenance: Provenance::boolean(
                BoolKind::Intersection,
                "a".to_string(),
                "b".to_string(),
            ),
        };
        let s = model.summary();
        assert_eq!(s.kind, "boolean");
        assert!(s.bounding_box.is_none());
        assert_eq!(s.volume, 0.0);
    }
}
