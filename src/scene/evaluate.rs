//! Modifier evaluation seam.

use std::borrow::Cow;

use super::{Mesh, Object, Scene};
use crate::util::Result;

/// Produces the modifier-applied mesh of an object.
///
/// The exporter treats this as a black box: it calls it only when modifiers
/// are to be applied before geometry extraction.
pub trait MeshEvaluator {
    fn evaluate<'a>(&'a self, scene: &'a Scene, object: &'a Object, mesh: &'a Mesh)
        -> Result<Cow<'a, Mesh>>;
}

/// Uses the snapshot's pre-baked [`Scene::evaluated_meshes`], falling back
/// to the unmodified mesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct BakedEvaluator;

impl MeshEvaluator for BakedEvaluator {
    fn evaluate<'a>(
        &'a self,
        scene: &'a Scene,
        object: &'a Object,
        mesh: &'a Mesh,
    ) -> Result<Cow<'a, Mesh>> {
        Ok(Cow::Borrowed(scene.evaluated_meshes.get(&object.name).unwrap_or(mesh)))
    }
}
