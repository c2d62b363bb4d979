//! Scene objects.

use serde::{Deserialize, Serialize};

use super::modifier::Modifier;
use super::physics::{RigidBody, RigidBodyConstraint};
use crate::util::Vec3;

/// Host key for UI metadata that is never exported as user data.
pub const INTERNAL_UI_KEY: &str = "_RNA_UI";

/// Datablock an object instantiates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectData {
    #[default]
    Empty,
    Mesh(String),
    Curve(String),
    Armature(String),
    Light(String),
    Camera(String),
    Speaker(String),
}

/// Sparse per-vertex weights of one vertex group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexGroup {
    pub name: String,
    /// `(vertex index, weight)` for every assigned vertex.
    pub weights: Vec<(u32, f32)>,
}

/// Scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Object {
    pub name: String,
    pub data: ObjectData,
    pub parent: Option<String>,
    pub location: Vec3,
    /// Euler rotation in radians.
    pub rotation_euler: Vec3,
    pub scale: Vec3,
    /// Bit per scene layer (20 layers).
    pub layers: u32,
    pub visible: bool,
    pub selected: bool,
    /// Material slots; empty slots are `None`.
    pub material_slots: Vec<Option<String>>,
    pub modifiers: Vec<Modifier>,
    pub rigid_body: Option<RigidBody>,
    pub rigid_body_constraint: Option<RigidBodyConstraint>,
    pub vertex_groups: Vec<VertexGroup>,
    pub active_vertex_group: Option<usize>,
    /// Custom key/value properties in host order.
    pub custom_properties: Vec<(String, String)>,
    /// Name of the assigned action.
    pub action: Option<String>,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            name: String::new(),
            data: ObjectData::Empty,
            parent: None,
            location: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
            layers: 1,
            visible: true,
            selected: false,
            material_slots: Vec::new(),
            modifiers: Vec::new(),
            rigid_body: None,
            rigid_body_constraint: None,
            vertex_groups: Vec::new(),
            active_vertex_group: None,
            custom_properties: Vec::new(),
            action: None,
        }
    }
}

impl Object {
    pub fn new(name: &str, data: ObjectData) -> Self {
        Self { name: name.to_string(), data, ..Default::default() }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_material(mut self, material: &str) -> Self {
        self.material_slots.push(Some(material.to_string()));
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.custom_properties.push((key.to_string(), value.to_string()));
        self
    }

    /// Custom properties that are exported as user data.
    pub fn user_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom_properties
            .iter()
            .filter(|(k, _)| k != INTERNAL_UI_KEY)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Object has at least one exportable custom property.
    pub fn has_user_properties(&self) -> bool {
        self.user_properties().next().is_some()
    }
}
