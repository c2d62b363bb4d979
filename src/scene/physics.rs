//! Rigid body simulation settings.

use serde::{Deserialize, Serialize};

/// Simulation role of a rigid body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BodyType {
    #[default]
    Active,
    Passive,
}

/// Collision primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollisionShape {
    Box,
    Sphere,
    Capsule,
    Cylinder,
    Cone,
    #[default]
    ConvexHull,
    Mesh,
}

impl CollisionShape {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Shape is built from the object's mesh.
    pub fn uses_mesh(self) -> bool {
        matches!(self, Self::ConvexHull | Self::Mesh)
    }
}

/// Rigid body attached to an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBody {
    pub body_type: BodyType,
    pub enabled: bool,
    pub kinematic: bool,
    pub start_deactivated: bool,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
    pub collision_shape: CollisionShape,
    pub collision_margin: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            body_type: BodyType::Active,
            enabled: true,
            kinematic: false,
            start_deactivated: false,
            mass: 1.0,
            linear_damping: 0.04,
            angular_damping: 0.1,
            friction: 0.5,
            restitution: 0.0,
            collision_shape: CollisionShape::ConvexHull,
            collision_margin: 0.04,
        }
    }
}

/// Spring settings for one degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringAxis {
    pub enabled: bool,
    pub stiffness: f32,
    pub damping: f32,
}

impl Default for SpringAxis {
    fn default() -> Self {
        Self { enabled: false, stiffness: 10.0, damping: 0.5 }
    }
}

/// Constraint variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    Fixed,
    Hinge {
        /// Angular limits in radians (lower, upper).
        #[serde(default)]
        limit: Option<(f32, f32)>,
    },
    GenericSpring {
        /// Linear x, y, z then angular x, y, z.
        #[serde(default)]
        springs: [SpringAxis; 6],
    },
    Point,
    Slider,
    Piston,
    Generic,
    Motor,
}

/// Rigid body constraint joining two objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyConstraint {
    pub kind: ConstraintKind,
    pub object1: Option<String>,
    pub object2: Option<String>,
    pub enabled: bool,
    pub disable_collisions: bool,
    pub breakable: bool,
    pub breaking_threshold: f32,
}

impl Default for RigidBodyConstraint {
    fn default() -> Self {
        Self {
            kind: ConstraintKind::Fixed,
            object1: None,
            object2: None,
            enabled: true,
            disable_collisions: true,
            breakable: false,
            breaking_threshold: 10.0,
        }
    }
}
