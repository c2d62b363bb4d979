//! Sounds and speakers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sound datablock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sound {
    pub name: String,
    /// Absolute, or relative to the project file.
    pub filepath: PathBuf,
    /// Bytes packed into the project, used instead of reading the file.
    pub packed: Option<Vec<u8>>,
}

/// Speaker datablock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speaker {
    pub name: String,
    pub sound: Option<String>,
    pub muted: bool,
    pub volume: f32,
    pub pitch: f32,
    pub attenuation: f32,
    pub volume_min: f32,
    pub volume_max: f32,
    pub distance_reference: f32,
    pub distance_max: f32,
    /// Cone angles in degrees.
    pub cone_angle_outer: f32,
    pub cone_angle_inner: f32,
}

impl Default for Speaker {
    fn default() -> Self {
        Self {
            name: String::new(),
            sound: None,
            muted: false,
            volume: 1.0,
            pitch: 1.0,
            attenuation: 1.0,
            volume_min: 0.0,
            volume_max: 1.0,
            distance_reference: 1.0,
            distance_max: f32::MAX,
            cone_angle_outer: 360.0,
            cone_angle_inner: 360.0,
        }
    }
}
