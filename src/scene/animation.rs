//! Keyframed actions.

use serde::{Deserialize, Serialize};

use crate::util::Vec2;

/// Interpolation from a keyframe to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
    /// Any easing curve (sine, quad, elastic, ...).
    #[serde(other)]
    Eased,
}

/// Keyframe in (frame, value) space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyframe {
    pub co: Vec2,
    pub handle_left: Vec2,
    pub handle_right: Vec2,
    pub interpolation: Interpolation,
}

impl Keyframe {
    /// Keyframe with flat handles one frame to either side.
    pub fn flat(frame: f32, value: f32, interpolation: Interpolation) -> Self {
        Self {
            co: Vec2::new(frame, value),
            handle_left: Vec2::new(frame - 1.0, value),
            handle_right: Vec2::new(frame + 1.0, value),
            interpolation,
        }
    }
}

/// Animation curve driving one component of a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FCurve {
    /// Host property path, e.g. `location` or `pose.bones["Arm"].rotation_euler`.
    pub data_path: String,
    pub array_index: u32,
    pub keyframes: Vec<Keyframe>,
}

/// Action datablock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    pub name: String,
    /// First and last frame.
    pub frame_range: [f32; 2],
    pub fcurves: Vec<FCurve>,
}
