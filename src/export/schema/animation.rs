//! Keyframed action writer (`ANIM`).
//!
//! Host property paths are retargeted to semantic channel paths:
//!
//! | host path                      | channel                          |
//! |--------------------------------|----------------------------------|
//! | `location`, `position`         | `Transform/Position/<axis>`      |
//! | `scale`                        | `Transform/Scale/<axis>`         |
//! | `rotation_euler`               | `Transform/RotationEuler/<axis>` |
//! | `rotation_quaternion`          | `Transform/RotationQuaternion/<axis>` |
//! | `pose.bones["B"].<any above>`  | `Bone/B/<channel>`               |
//!
//! Curves on any other path are skipped.

use std::io::{Seek, Write};

use tracing::warn;

use crate::chunk::OStream;
use crate::scene::{Action, FCurve, Interpolation, Keyframe};
use crate::util::{Error, Result, Vec2};

pub const VERSION: u32 = 2;

/// Curve value type: single float.
const VALUE_FLOAT: u16 = 0;

const AXES: [&str; 4] = ["X", "Y", "Z", "W"];
const BONE_PREFIX: &str = "pose.bones[\"";
const BONE_SUFFIX: &str = "\"].";

/// Semantic channel path of a host curve, or `None` when untranslatable.
pub fn translate_path(data_path: &str, array_index: u32) -> Option<String> {
    let (bone, property) = match data_path.strip_prefix(BONE_PREFIX) {
        Some(rest) => {
            let (bone, property) = rest.split_once(BONE_SUFFIX)?;
            (Some(bone), property)
        }
        None => (None, data_path),
    };

    let channel = match property {
        "location" | "position" => "Transform/Position",
        "scale" => "Transform/Scale",
        "rotation_euler" => "Transform/RotationEuler",
        "rotation_quaternion" => "Transform/RotationQuaternion",
        _ => return None,
    };
    let axis = AXES.get(array_index as usize)?;

    Some(match bone {
        Some(bone) => format!("Bone/{bone}/{channel}/{axis}"),
        None => format!("{channel}/{axis}"),
    })
}

/// Wire code of a keyframe interpolation: step, linear or smooth.
pub fn interpolation_code(interpolation: Interpolation) -> u16 {
    match interpolation {
        Interpolation::Constant => 0,
        Interpolation::Linear => 1,
        Interpolation::Bezier | Interpolation::Eased => 2,
    }
}

/// Angle in radians of the direction from `from` to `to`.
#[inline]
fn tangent_angle(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

fn is_rotation_euler(data_path: &str) -> bool {
    data_path == "rotation_euler" || data_path.ends_with(".rotation_euler")
}

/// Write the `ANIM` payload. Time is converted from frames to seconds.
pub fn write_action<W: Write + Seek>(out: &mut OStream<W>, action: &Action, fps: f32) -> Result<()> {
    if fps.is_nan() || fps <= 0.0 {
        return Err(Error::invalid(format!("frame rate must be positive, got {fps}")));
    }

    let curves: Vec<(String, &FCurve)> = action
        .fcurves
        .iter()
        .filter_map(|curve| match translate_path(&curve.data_path, curve.array_index) {
            Some(path) => Some((path, curve)),
            None => {
                warn!(
                    "Action {:?}: unable to translate animation path {}[{}]",
                    action.name, curve.data_path, curve.array_index
                );
                None
            }
        })
        .collect();

    out.write_string(&action.name)?;
    out.write_f32(action.frame_range[0] / fps)?;
    out.write_f32(action.frame_range[1] / fps)?;
    out.write_u32(curves.len() as u32)?;

    for (path, curve) in curves {
        let degrees = is_rotation_euler(&curve.data_path);
        out.write_string(&path)?;
        out.write_u16(VALUE_FLOAT)?;
        out.write_u32(curve.keyframes.len() as u32)?;
        for key in &curve.keyframes {
            write_key(out, key, fps, degrees)?;
        }
    }
    Ok(())
}

fn write_key<W: Write + Seek>(
    out: &mut OStream<W>,
    key: &Keyframe,
    fps: f32,
    degrees: bool,
) -> Result<()> {
    let value = if degrees { key.co.y.to_degrees() } else { key.co.y };
    out.write_f32(key.co.x / fps)?;
    out.write_f32(value)?;
    out.write_f32(tangent_angle(key.handle_left, key.co))?;
    out.write_f32(tangent_angle(key.co, key.handle_right))?;
    out.write_u16(interpolation_code(key.interpolation))
}
