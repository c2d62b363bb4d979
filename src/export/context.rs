//! Run-scoped export state.
//!
//! One [`ExportContext`] is built per export call and threaded through every
//! encoder. Nothing outlives the run, so repeated exports never share
//! identifiers or registrations.

use std::collections::HashMap;
use std::fmt;

use super::options::ExportOptions;
use super::resource::ResourceResolver;
use crate::chunk::NULL_REF;
use crate::scene::{MeshEvaluator, Scene};
use crate::util::{Error, Result};

/// Entity category of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Mesh,
    Material,
    Texture,
    Camera,
    Light,
    Sound,
    Speaker,
    Armature,
    Curve,
    Action,
    RigidBody,
    Collider,
    Constraint,
    VertexGroup,
    Modifier,
    UserData,
    Object,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::Texture => "texture",
            Self::Camera => "camera",
            Self::Light => "light",
            Self::Sound => "sound",
            Self::Speaker => "speaker",
            Self::Armature => "armature",
            Self::Curve => "curve",
            Self::Action => "action",
            Self::RigidBody => "rigid body",
            Self::Collider => "collider",
            Self::Constraint => "constraint",
            Self::VertexGroup => "vertex group",
            Self::Modifier => "modifier",
            Self::UserData => "user data",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-category map from source entity name to chunk identifier.
#[derive(Debug, Default)]
pub struct Registry {
    maps: HashMap<Category, HashMap<String, u32>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the identifier of an entity, replacing any previous entry.
    pub fn register(&mut self, category: Category, name: &str, id: u32) {
        self.maps.entry(category).or_default().insert(name.to_string(), id);
    }

    /// Identifier of an entity, if it was written.
    pub fn get(&self, category: Category, name: &str) -> Option<u32> {
        self.maps.get(&category).and_then(|m| m.get(name)).copied()
    }

    /// Identifier of an entity that must have been written already.
    ///
    /// A miss means the category ordering was violated and aborts the run.
    pub fn lookup(&self, category: Category, name: &str) -> Result<u32> {
        self.get(category, name).ok_or_else(|| Error::Unregistered {
            category: category.name(),
            name: name.to_string(),
        })
    }

    /// Identifier of a scheduled object, or the null reference for `None`.
    pub fn object_ref(&self, name: Option<&str>) -> Result<u32> {
        match name {
            Some(name) => self.lookup(Category::Object, name),
            None => Ok(NULL_REF),
        }
    }

    /// Number of entries in a category.
    pub fn len(&self, category: Category) -> usize {
        self.maps.get(&category).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.maps.values().all(HashMap::is_empty)
    }
}

/// State threaded through one export run.
pub struct ExportContext<'a> {
    pub scene: &'a Scene,
    pub options: &'a ExportOptions,
    pub resources: ResourceResolver,
    pub evaluator: &'a dyn MeshEvaluator,
    pub registry: Registry,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        scene: &'a Scene,
        options: &'a ExportOptions,
        resources: ResourceResolver,
        evaluator: &'a dyn MeshEvaluator,
    ) -> Self {
        Self { scene, options, resources, evaluator, registry: Registry::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_lookup() {
        let mut reg = Registry::new();
        assert!(reg.is_empty());
        reg.register(Category::Mesh, "Cube", 12);
        reg.register(Category::Material, "Cube", 7);

        assert_eq!(reg.lookup(Category::Mesh, "Cube").unwrap(), 12);
        assert_eq!(reg.lookup(Category::Material, "Cube").unwrap(), 7);
        assert_eq!(reg.get(Category::Camera, "Cube"), None);
        assert_eq!(reg.len(Category::Mesh), 1);
    }

    #[test]
    fn test_lookup_miss_is_error() {
        let reg = Registry::new();
        let err = reg.lookup(Category::Texture, "Wood").unwrap_err();
        assert!(matches!(err, Error::Unregistered { category: "texture", .. }));
        assert!(err.to_string().contains("Wood"));
    }
}
