#![warn(missing_docs)]

//! Operation IR for the chatcad conversational CAD engine.
//!
//! This crate defines the typed operation stream that the reasoning
//! collaborator emits for each conversation turn: primitive descriptions,
//! transforms, and boolean combinations, all referencing models by stable
//! identifier.
//!
//! The IR is purely declarative: no mesh data, just operations. Realizing
//! meshes is the composition engine's job.

use serde::{Deserialize, Serialize};

/// Stable, user-visible identifier for a model in the registry.
pub type ModelId = String;

/// 3D vector with f64 components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// A vector with all components equal to `v`.
    pub fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }
}

/// Local pose applied to a primitive at construction time.
///
/// Orientation is Euler angles in degrees, applied as roll (Z), then yaw
/// (Y), then pitch (X), so the combined rotation is `Rz * Ry * Rx`,
/// followed by translation to `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    /// Position of the primitive's local origin.
    #[serde(default)]
    pub position: Option<Vec3>,
    /// Rotation about the X axis, degrees.
    #[serde(default)]
    pub pitch: f64,
    /// Rotation about the Y axis, degrees.
    #[serde(default)]
    pub yaw: f64,
    /// Rotation about the Z axis, degrees.
    #[serde(default)]
    pub roll: f64,
}

impl Pose {
    /// True if the pose is the identity (no translation, no rotation).
    pub fn is_identity(&self) -> bool {
        self.position.is_none() && self.pitch == 0.0 && self.yaw == 0.0 && self.roll == 0.0
    }
}

/// Parametric description of a base solid. Immutable once created.
///
/// Each variant carries only its defining numeric parameters plus an
/// optional local [`Pose`]. All primitives are generated centered at their
/// local origin, then posed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Primitive {
    /// Axis-aligned box centered at origin.
    Cuboid {
        /// Extent along X.
        width: f64,
        /// Extent along Y.
        height: f64,
        /// Extent along Z.
        depth: f64,
        /// Optional local pose.
        #[serde(default)]
        pose: Pose,
    },
    /// Elliptical cylinder along the Z axis, centered at origin.
    EllipticCylinder {
        /// Semi-axis along X.
        radius_x: f64,
        /// Semi-axis along Y.
        radius_y: f64,
        /// Extent along Z.
        height: f64,
        /// Number of cross-section segments (0 = default).
        #[serde(default)]
        segments: u32,
        /// Optional local pose.
        #[serde(default)]
        pose: Pose,
    },
    /// Half cylinder along the Z axis: half-disk cross-section over the
    /// angle range [0, π], flat face on the y = 0 plane.
    HalfCylinder {
        /// Radius of the half-disk.
        radius: f64,
        /// Extent along Z.
        height: f64,
        /// Number of arc segments (0 = default).
        #[serde(default)]
        segments: u32,
        /// Optional local pose.
        #[serde(default)]
        pose: Pose,
    },
    /// NACA 4-digit airfoil profile extruded along the span.
    ///
    /// Chord runs along +X, span along +Y, thickness along +Z.
    AirfoilExtrusion {
        /// 4-digit NACA designation, e.g. "0012" or "2412".
        naca_code: String,
        /// Chord length.
        chord_length: f64,
        /// Extrusion length along the span.
        span: f64,
        /// Number of chordwise sample stations (0 = default).
        #[serde(default)]
        samples: u32,
        /// Optional local pose.
        #[serde(default)]
        pose: Pose,
    },
}

impl Primitive {
    /// Short lowercase kind name, used in provenance and feedback.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Cuboid { .. } => "cuboid",
            Primitive::EllipticCylinder { .. } => "elliptic_cylinder",
            Primitive::HalfCylinder { .. } => "half_cylinder",
            Primitive::AirfoilExtrusion { .. } => "airfoil_extrusion",
        }
    }

    /// The local pose attached to this primitive.
    pub fn pose(&self) -> &Pose {
        match self {
            Primitive::Cuboid { pose, .. }
            | Primitive::EllipticCylinder { pose, .. }
            | Primitive::HalfCylinder { pose, .. }
            | Primitive::AirfoilExtrusion { pose, .. } => pose,
        }
    }
}

/// Boolean combination operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolKind {
    /// Union of both operands.
    Union,
    /// Intersection of both operands.
    Intersection,
    /// Left minus right. Order-sensitive.
    Difference,
}

/// A single typed operation, referencing models by identifier only.
///
/// Operations are pure data produced by the reasoning collaborator; the
/// engine treats every incoming operation as untrusted and validates it
/// fully before touching the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    /// Realize a primitive and insert it under a fresh identifier.
    CreatePrimitive {
        /// Identifier for the new model.
        id: ModelId,
        /// The primitive to realize.
        primitive: Primitive,
    },
    /// Translate an existing model by an offset.
    Translate {
        /// Target model.
        id: ModelId,
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotate an existing model by Euler angles in degrees (X, then Y,
    /// then Z) about its origin, or about `pivot` if given.
    Rotate {
        /// Target model.
        id: ModelId,
        /// Rotation angles in degrees.
        angles: Vec3,
        /// Optional pivot point; defaults to the model's origin.
        #[serde(default)]
        pivot: Option<Vec3>,
    },
    /// Scale an existing model about its origin, per-axis.
    Scale {
        /// Target model.
        id: ModelId,
        /// Scale factors per axis.
        factor: Vec3,
    },
    /// Combine two models with a boolean operator.
    BooleanCombine {
        /// Left operand.
        left: ModelId,
        /// Right operand.
        right: ModelId,
        /// The boolean operator.
        op: BoolKind,
        /// Identifier for the result. May reuse `left` or `right`.
        result: ModelId,
    },
}

impl Operation {
    /// The identifier this operation produces or replaces.
    pub fn output_id(&self) -> &ModelId {
        match self {
            Operation::CreatePrimitive { id, .. }
            | Operation::Translate { id, .. }
            | Operation::Rotate { id, .. }
            | Operation::Scale { id, .. } => id,
            Operation::BooleanCombine { result, .. } => result,
        }
    }
}

/// Ordered sequence of operations for one conversation turn.
///
/// Append-only while the turn is being assembled; immutable once handed to
/// the composition engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationLog {
    /// The operations, in application order.
    pub operations: Vec<Operation>,
}

impl OperationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation to the log.
    pub fn push(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Number of operations in the log.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if the log contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
