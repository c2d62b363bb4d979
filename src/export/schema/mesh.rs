//! Geometry encoder (`MESH`).
//!
//! Faces are bucketed by material slot and then by side count, so each
//! (material, arity) pair becomes one homogeneous primitive group:
//!
//! ```text
//! per material: u16 group_count
//!   per group (ascending arity): u32 face_count, u16 arity,
//!     per face loop: idx vertex, f32x2 per uv layer, rgba per color layer
//! ```
//!
//! Only sharp, seamed or creased edges are written; the rest are implied by
//! the face loops. Which property applies to which edge is expressed as
//! (tag, edge) links so other element kinds can be tagged later.

use std::collections::BTreeMap;
use std::io::{Seek, Write};

use tracing::warn;

use crate::chunk::OStream;
use crate::scene::{ColorLayer, Edge, Mesh, UvLayer};
use crate::util::{BBox3f, Error, Result, Vec2, Vec3};

pub const VERSION: u32 = 3;

/// Largest vertex count addressable with 16-bit indices.
pub const MAX_COMPACT_VERTICES: usize = 65535;

/// Link element type: edge.
pub const EDGE_LINK: u16 = 1;

/// Vertex, edge and loop indices are 32-bit.
#[inline]
pub fn uses_wide_indices(vertex_count: usize) -> bool {
    vertex_count > MAX_COMPACT_VERTICES
}

/// Edge property expressed through tag links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeTag {
    Sharp,
    Seam,
    Crease,
}

impl EdgeTag {
    pub const ALL: [Self; 3] = [Self::Sharp, Self::Seam, Self::Crease];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sharp => "SHARP",
            Self::Seam => "SEAM",
            Self::Crease => "CREASE",
        }
    }

    fn applies(self, edge: &Edge) -> bool {
        match self {
            Self::Sharp => edge.is_sharp(),
            Self::Seam => edge.seam,
            Self::Crease => edge.is_creased(),
        }
    }
}

/// Edge is written explicitly.
#[inline]
pub fn is_export_edge(edge: &Edge) -> bool {
    edge.is_sharp() || edge.seam || edge.is_creased()
}

/// Precomputed layout of a mesh payload.
#[derive(Debug)]
pub struct GeometryLayout<'m> {
    pub wide: bool,
    pub export_edges: Vec<&'m Edge>,
    /// Distinct tags in use, in [`EdgeTag::ALL`] order.
    pub tags: Vec<EdgeTag>,
    /// `(tag index, export edge index)`.
    pub links: Vec<(u16, u32)>,
    /// Per material bucket: arity -> face indices.
    pub buckets: Vec<BTreeMap<usize, Vec<usize>>>,
}

impl<'m> GeometryLayout<'m> {
    /// Lay out `geometry` for `material_count` material slots.
    pub fn new(geometry: &'m Mesh, material_count: usize) -> Self {
        let export_edges: Vec<&Edge> = geometry.edges.iter().filter(|e| is_export_edge(e)).collect();

        let tags: Vec<EdgeTag> = EdgeTag::ALL
            .into_iter()
            .filter(|t| export_edges.iter().any(|e| t.applies(e)))
            .collect();

        let mut links = Vec::new();
        for (index, edge) in export_edges.iter().enumerate() {
            for (tag_index, tag) in tags.iter().enumerate() {
                if tag.applies(edge) {
                    links.push((tag_index as u16, index as u32));
                }
            }
        }

        let bucket_count = material_count.max(1);
        let mut buckets = vec![BTreeMap::<usize, Vec<usize>>::new(); bucket_count];
        for (index, face) in geometry.faces.iter().enumerate() {
            let slot = (face.material_index.max(0) as usize).min(bucket_count - 1);
            buckets[slot].entry(face.arity()).or_default().push(index);
        }

        // Link elements index export edges, which may outnumber vertices.
        let wide = uses_wide_indices(geometry.vertices.len().max(export_edges.len()));

        Self {
            wide,
            export_edges,
            tags,
            links,
            buckets,
        }
    }
}

/// Write the `MESH` payload.
///
/// `mesh` supplies the name, bounds, layer headers and material count;
/// `geometry` (the mesh itself or its modifier-applied result) supplies
/// vertices, edges, faces and per-loop layer data.
pub fn write_mesh<W: Write + Seek>(out: &mut OStream<W>, mesh: &Mesh, geometry: &Mesh) -> Result<()> {
    out.write_string(&mesh.name)?;

    let bounds = BBox3f::from_points(mesh.vertices.iter().map(|v| v.co));
    out.write_vec3(bounds.min)?;
    out.write_vec3(bounds.max)?;
    out.write_vec3(bounds.center())?;

    out.write_u16(layer_count(mesh.uv_layers.len(), &mesh.name)?)?;
    out.write_u16(layer_count(mesh.color_layers.len(), &mesh.name)?)?;
    for layer in &mesh.uv_layers {
        out.write_string(&layer.name)?;
        out.write_flag(layer.active)?;
    }
    for layer in &mesh.color_layers {
        out.write_string(&layer.name)?;
        out.write_flag(layer.active_render)?;
    }

    let uvs: Vec<Option<&UvLayer>> = mesh
        .uv_layers
        .iter()
        .map(|l| find_layer(&geometry.uv_layers, &l.name, |g| &g.name, &mesh.name))
        .collect();
    let colors: Vec<Option<&ColorLayer>> = mesh
        .color_layers
        .iter()
        .map(|l| find_layer(&geometry.color_layers, &l.name, |g| &g.name, &mesh.name))
        .collect();

    let loops = geometry.loop_count();
    let short_layer = uvs.iter().flatten().any(|l| l.uvs.len() < loops)
        || colors.iter().flatten().any(|l| l.colors.len() < loops);
    if short_layer {
        warn!("Mesh {:?}: layer shorter than {} loops, padding with zeros", mesh.name, loops);
    }

    let layout = GeometryLayout::new(geometry, mesh.materials.len());
    let wide = layout.wide;

    out.write_u32(geometry.vertices.len() as u32)?;
    out.write_u32(layout.export_edges.len() as u32)?;
    out.write_u32(mesh.materials.len() as u32)?;
    out.write_flag(wide)?;

    for v in &geometry.vertices {
        out.write_vec3(v.co)?;
        out.write_vec3(v.normal)?;
    }
    for edge in &layout.export_edges {
        out.write_index(edge.vertices[0], wide)?;
        out.write_index(edge.vertices[1], wide)?;
        out.write_f32(edge.crease)?;
    }

    out.write_u16(layout.tags.len() as u16)?;
    for tag in &layout.tags {
        out.write_string(tag.name())?;
    }
    out.write_u32(layout.links.len() as u32)?;
    for &(tag_index, edge) in &layout.links {
        out.write_u16(EDGE_LINK)?;
        out.write_u16(tag_index)?;
        out.write_index(edge, wide)?;
    }

    let loop_starts = geometry.loop_starts();
    for bucket in &layout.buckets {
        out.write_u16(bucket.len() as u16)?;
        for (&arity, faces) in bucket {
            let arity16 = u16::try_from(arity).map_err(|_| {
                Error::invalid(format!("mesh {:?} has a face with {arity} sides", mesh.name))
            })?;
            out.write_u32(faces.len() as u32)?;
            out.write_u16(arity16)?;
            for &face_index in faces {
                let face = &geometry.faces[face_index];
                let first = loop_starts[face_index];
                for (corner, &vertex) in face.vertices.iter().enumerate() {
                    let loop_index = first + corner;
                    out.write_index(vertex, wide)?;
                    for layer in &uvs {
                        out.write_vec2(loop_value(layer.map(|l| l.uvs.as_slice()), loop_index, Vec2::ZERO))?;
                    }
                    for layer in &colors {
                        let rgb = loop_value(layer.map(|l| l.colors.as_slice()), loop_index, Vec3::ZERO);
                        out.write_rgb_opaque(rgb)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn layer_count(count: usize, mesh: &str) -> Result<u16> {
    u16::try_from(count).map_err(|_| Error::invalid(format!("mesh {mesh:?} has too many layers")))
}

fn find_layer<'a, L>(
    layers: &'a [L],
    name: &str,
    name_of: impl Fn(&L) -> &String,
    mesh: &str,
) -> Option<&'a L> {
    let found = layers.iter().find(|l| name_of(l) == name);
    if found.is_none() {
        warn!("Mesh {:?}: layer {:?} missing from evaluated geometry, writing zeros", mesh, name);
    }
    found
}

#[inline]
fn loop_value<T: Copy>(values: Option<&[T]>, index: usize, fallback: T) -> T {
    values.and_then(|v| v.get(index)).copied().unwrap_or(fallback)
}
