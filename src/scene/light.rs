//! Lights, cameras and world settings.

use serde::{Deserialize, Serialize};

use crate::util::Vec3;

/// Light variant with its kind-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightKind {
    Point,
    Spot {
        /// Cone angle in radians.
        spot_size: f32,
        /// Softness in 0..=1.
        spot_blend: f32,
    },
    Sun,
    Area {
        size: f32,
        /// Set for rectangular lamps; square lamps use `size` on both axes.
        size_y: Option<f32>,
    },
    /// Not representable in SCN; skipped on export.
    Hemi,
}

/// Shadow settings of a shadow-casting light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Vec3,
    pub soft_size: f32,
}

/// Light datablock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: Vec3,
    pub energy: f32,
    pub distance: f32,
    pub shadow: Option<Shadow>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: LightKind::Point,
            color: Vec3::ONE,
            energy: 1.0,
            distance: 25.0,
            shadow: None,
        }
    }
}

/// Camera projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Projection {
    Orthographic { scale: f32 },
    /// Field of view in radians.
    Perspective { angle: f32 },
}

/// Camera datablock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub name: String,
    pub projection: Projection,
    pub clip_start: f32,
    pub clip_end: f32,
    pub sensor_width: f32,
    pub sensor_height: f32,
    /// Focus distance; 0 disables unless a focus object is set.
    pub dof_distance: f32,
    /// Object the camera focuses on.
    pub dof_object: Option<String>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            name: String::new(),
            projection: Projection::Perspective { angle: 0.857_556 },
            clip_start: 0.1,
            clip_end: 100.0,
            sensor_width: 32.0,
            sensor_height: 18.0,
            dof_distance: 0.0,
            dof_object: None,
        }
    }
}

impl Camera {
    /// Depth-of-field block is written.
    pub fn has_dof(&self) -> bool {
        self.dof_distance > 0.0 || self.dof_object.is_some()
    }
}

/// Mist falloff curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MistFalloff {
    #[default]
    Quadratic,
    Linear,
    InverseQuadratic,
}

/// Mist (fog) settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mist {
    pub intensity: f32,
    pub start: f32,
    pub depth: f32,
    pub height: f32,
    pub falloff: MistFalloff,
}

impl Default for Mist {
    fn default() -> Self {
        Self { intensity: 0.0, start: 5.0, depth: 25.0, height: 0.0, falloff: MistFalloff::Quadratic }
    }
}

/// World (environment) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct World {
    pub name: String,
    pub ambient_color: Vec3,
    pub zenith_color: Vec3,
    pub horizon_color: Vec3,
    pub mist: Option<Mist>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            name: "World".to_string(),
            ambient_color: Vec3::ZERO,
            zenith_color: Vec3::new(0.04, 0.04, 0.04),
            horizon_color: Vec3::new(0.05, 0.05, 0.05),
            mist: None,
        }
    }
}
