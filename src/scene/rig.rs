//! Armatures and curves.

use serde::{Deserialize, Serialize};

use crate::util::Vec3;

/// Bone in rest pose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bone {
    pub name: String,
    /// Name of the parent bone within the same armature.
    pub parent: Option<String>,
    pub head: Vec3,
    pub tail: Vec3,
    pub roll: f32,
}

/// Armature datablock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<Bone>,
}

/// Spline interpolation type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplineKind {
    #[default]
    Poly,
    Bezier,
    Bspline,
    Cardinal,
    Nurbs,
}

impl SplineKind {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Tilt interpolation along a spline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TiltInterpolation {
    #[default]
    Linear,
    Cardinal,
    Bspline,
    Ease,
}

impl TiltInterpolation {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Control point. Handles are only meaningful on bezier splines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplinePoint {
    pub co: Vec3,
    pub radius: f32,
    pub tilt: f32,
    pub weight: f32,
    pub handle_left: Vec3,
    pub handle_right: Vec3,
}

impl Default for SplinePoint {
    fn default() -> Self {
        Self {
            co: Vec3::ZERO,
            radius: 1.0,
            tilt: 0.0,
            weight: 1.0,
            handle_left: Vec3::ZERO,
            handle_right: Vec3::ZERO,
        }
    }
}

/// One spline of a curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spline {
    pub kind: SplineKind,
    pub tilt_interpolation: TiltInterpolation,
    pub points: Vec<SplinePoint>,
}

/// Curve datablock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Curve {
    pub name: String,
    pub splines: Vec<Spline>,
}
