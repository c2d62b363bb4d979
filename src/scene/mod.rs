//! Host scene snapshot.
//!
//! Read-only plain data describing everything the exporter consumes. A host
//! application fills a [`Scene`] (or deserializes one from JSON) and hands it
//! to the exporter, which never mutates it.

mod animation;
mod audio;
mod evaluate;
mod light;
mod material;
mod mesh;
mod modifier;
mod object;
mod physics;
mod rig;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::Result;

pub use animation::*;
pub use audio::*;
pub use evaluate::*;
pub use light::*;
pub use material::*;
pub use mesh::*;
pub use modifier::*;
pub use object::*;
pub use physics::*;
pub use rig::*;

/// Project-level information about the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneInfo {
    /// Host application and version, e.g. `Blender 2.78 (release)`.
    pub application: String,
    /// Path of the host project file, if saved.
    pub project_path: Option<PathBuf>,
    /// Frames per second of the scene timeline.
    pub fps: f32,
}

impl Default for SceneInfo {
    fn default() -> Self {
        Self { application: "unknown".to_string(), project_path: None, fps: 24.0 }
    }
}

/// Complete scene snapshot, category by category in host enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub info: SceneInfo,
    pub worlds: Vec<World>,
    pub actions: Vec<Action>,
    pub sounds: Vec<Sound>,
    pub speakers: Vec<Speaker>,
    pub lights: Vec<Light>,
    pub cameras: Vec<Camera>,
    pub textures: Vec<Texture>,
    pub materials: Vec<Material>,
    pub armatures: Vec<Armature>,
    pub curves: Vec<Curve>,
    pub meshes: Vec<Mesh>,
    pub objects: Vec<Object>,
    /// Modifier-applied meshes keyed by object name.
    pub evaluated_meshes: BTreeMap<String, Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON snapshot.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Decode a JSON snapshot from a string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Objects instantiating the named mesh.
    pub fn mesh_users<'a>(&'a self, mesh: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects
            .iter()
            .filter(move |o| matches!(&o.data, ObjectData::Mesh(m) if m == mesh))
    }
}
