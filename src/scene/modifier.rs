//! Object modifier stack.

use serde::{Deserialize, Serialize};

use crate::util::Vec3;

/// Modifier variant with its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierKind {
    Array {
        count: u32,
        #[serde(default)]
        relative_offset: Option<Vec3>,
        #[serde(default)]
        constant_offset: Option<Vec3>,
        /// Object whose transform drives the per-copy offset.
        #[serde(default)]
        offset_object: Option<String>,
        #[serde(default)]
        merge_threshold: Option<f32>,
    },
    Mirror {
        axes: [bool; 3],
        #[serde(default)]
        use_clip: bool,
        #[serde(default)]
        merge_threshold: Option<f32>,
        #[serde(default)]
        mirror_object: Option<String>,
    },
    Subdivision {
        levels: u16,
        render_levels: u16,
    },
    Solidify {
        thickness: f32,
        offset: f32,
    },
    Bevel {
        width: f32,
        segments: u16,
    },
    Decimate {
        ratio: f32,
    },
    EdgeSplit {
        /// Split angle in radians, when splitting by angle.
        split_angle: Option<f32>,
        use_edge_sharp: bool,
    },
    Triangulate,
    /// Host modifier without an SCN body.
    Other {
        host_type: String,
    },
}

/// One entry of an object's modifier stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(default = "default_true")]
    pub show_viewport: bool,
    #[serde(default = "default_true")]
    pub show_render: bool,
    #[serde(flatten)]
    pub kind: ModifierKind,
}

fn default_true() -> bool {
    true
}

impl Modifier {
    pub fn new(name: &str, kind: ModifierKind) -> Self {
        Self { name: name.to_string(), show_viewport: true, show_render: true, kind }
    }
}
