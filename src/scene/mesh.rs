//! Polygon mesh data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::util::{Vec2, Vec3};

/// Mesh vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub co: Vec3,
    #[serde(default)]
    pub normal: Vec3,
}

/// Mesh edge with its shading flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edge {
    pub vertices: [u32; 2],
    pub smooth: bool,
    pub seam: bool,
    pub crease: f32,
}

impl Default for Edge {
    fn default() -> Self {
        Self { vertices: [0, 0], smooth: true, seam: false, crease: 0.0 }
    }
}

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        Self { vertices: [a, b], ..Default::default() }
    }

    /// Marked sharp (not smooth-shaded).
    #[inline]
    pub fn is_sharp(&self) -> bool {
        !self.smooth
    }

    /// Carries a positive crease weight.
    #[inline]
    pub fn is_creased(&self) -> bool {
        self.crease > 0.0
    }
}

/// Polygon: ordered loop of vertex indices plus a material slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub vertices: SmallVec<[u32; 4]>,
    #[serde(default)]
    pub material_index: i32,
}

impl Face {
    pub fn new(vertices: &[u32]) -> Self {
        Self { vertices: SmallVec::from_slice(vertices), material_index: 0 }
    }

    pub fn with_material(mut self, index: i32) -> Self {
        self.material_index = index;
        self
    }

    /// Number of sides.
    #[inline]
    pub fn arity(&self) -> usize {
        self.vertices.len()
    }
}

/// Per-loop UV layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UvLayer {
    pub name: String,
    #[serde(default)]
    pub active: bool,
    /// One coordinate per face loop, in face order.
    #[serde(default)]
    pub uvs: Vec<Vec2>,
}

/// Per-loop vertex color layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorLayer {
    pub name: String,
    #[serde(default)]
    pub active_render: bool,
    /// One RGB color per face loop, in face order.
    #[serde(default)]
    pub colors: Vec<Vec3>,
}

/// Polygon mesh datablock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mesh {
    pub name: String,
    /// Number of objects using this mesh. Unused meshes are not exported.
    pub users: u32,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Face>,
    pub uv_layers: Vec<UvLayer>,
    pub color_layers: Vec<ColorLayer>,
    /// Material slots of the mesh datablock.
    pub materials: Vec<Option<String>>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            name: String::new(),
            users: 1,
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            uv_layers: Vec::new(),
            color_layers: Vec::new(),
            materials: Vec::new(),
        }
    }
}

impl Mesh {
    /// Create an empty mesh with one user.
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }

    /// Build a mesh from positions and polygons.
    ///
    /// Edges are derived from the face loops (smooth, no seams), vertex
    /// normals are the normalized sum of adjacent face normals.
    pub fn from_polygons(name: &str, positions: &[Vec3], polygons: &[&[u32]]) -> Self {
        let mut mesh = Self::new(name);
        let mut normals = vec![Vec3::ZERO; positions.len()];
        let mut seen: HashSet<(u32, u32)> = HashSet::new();

        for poly in polygons {
            let n = newell_normal(positions, poly);
            for (i, &v) in poly.iter().enumerate() {
                if let Some(acc) = normals.get_mut(v as usize) {
                    *acc += n;
                }
                let w = poly[(i + 1) % poly.len()];
                let key = (v.min(w), v.max(w));
                if seen.insert(key) {
                    mesh.edges.push(Edge::new(key.0, key.1));
                }
            }
            mesh.faces.push(Face::new(poly));
        }

        mesh.vertices = positions
            .iter()
            .zip(normals)
            .map(|(&co, n)| Vertex { co, normal: n.normalize_or_zero() })
            .collect();
        mesh
    }

    /// Unit cube centered at the origin: 8 vertices, 6 quads.
    pub fn cube(name: &str) -> Self {
        let p = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        let faces: [&[u32]; 6] = [
            &[0, 3, 2, 1],
            &[4, 5, 6, 7],
            &[0, 1, 5, 4],
            &[1, 2, 6, 5],
            &[2, 3, 7, 6],
            &[3, 0, 4, 7],
        ];
        Self::from_polygons(name, &p, &faces)
    }

    /// Total number of face loops.
    pub fn loop_count(&self) -> usize {
        self.faces.iter().map(Face::arity).sum()
    }

    /// Index of the first loop of every face.
    pub fn loop_starts(&self) -> Vec<usize> {
        let mut starts = Vec::with_capacity(self.faces.len());
        let mut acc = 0;
        for face in &self.faces {
            starts.push(acc);
            acc += face.arity();
        }
        starts
    }
}

fn newell_normal(positions: &[Vec3], poly: &[u32]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, &a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        let (Some(pa), Some(pb)) = (positions.get(a as usize), positions.get(b as usize)) else {
            continue;
        };
        n.x += (pa.y - pb.y) * (pa.z + pb.z);
        n.y += (pa.z - pb.z) * (pa.x + pb.x);
        n.z += (pa.x - pb.x) * (pa.y + pb.y);
    }
    n.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_topology() {
        let cube = Mesh::cube("Cube");
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.edges.len(), 12);
        assert_eq!(cube.faces.len(), 6);
        assert_eq!(cube.loop_count(), 24);
        assert_eq!(cube.loop_starts(), vec![0, 4, 8, 12, 16, 20]);
        assert!(cube.edges.iter().all(|e| e.smooth && !e.seam));
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = Mesh::cube("Cube");
        for v in &cube.vertices {
            assert!(v.co.dot(v.normal) > 0.0, "{:?}", v);
        }
    }
}
