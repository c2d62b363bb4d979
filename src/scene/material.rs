//! Materials, textures and images.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::Vec3;

/// Layer blending mode of a texture slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendType {
    #[default]
    Mix,
    Add,
    Subtract,
    Multiply,
    Screen,
    Overlay,
    Difference,
    Divide,
    Darken,
    Lighten,
    Hue,
    Saturation,
    Value,
    Color,
}

impl BlendType {
    /// Wire code.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// A texture slot of a material.
///
/// Each mapping channel is `Some(factor)` when the slot drives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSlot {
    /// Name of the texture datablock.
    pub texture: String,
    /// Slot is enabled.
    pub enabled: bool,
    pub blend: BlendType,
    pub offset: Vec3,
    pub scale: Vec3,
    pub diffuse_color: Option<f32>,
    pub diffuse_intensity: Option<f32>,
    pub specular_color: Option<f32>,
    pub specular_intensity: Option<f32>,
    pub hardness: Option<f32>,
    pub displacement: Option<f32>,
    pub ambient: Option<f32>,
    pub translucency: Option<f32>,
    pub alpha: Option<f32>,
    pub normal: Option<f32>,
    pub emission: Option<f32>,
}

impl Default for TextureSlot {
    fn default() -> Self {
        Self {
            texture: String::new(),
            enabled: true,
            blend: BlendType::Mix,
            offset: Vec3::ZERO,
            scale: Vec3::ONE,
            diffuse_color: None,
            diffuse_intensity: None,
            specular_color: None,
            specular_intensity: None,
            hardness: None,
            displacement: None,
            ambient: None,
            translucency: None,
            alpha: None,
            normal: None,
            emission: None,
        }
    }
}

impl TextureSlot {
    /// Slot driving only the diffuse color channel.
    pub fn diffuse(texture: &str) -> Self {
        Self { texture: texture.to_string(), diffuse_color: Some(1.0), ..Default::default() }
    }
}

/// Material datablock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub name: String,
    /// Number of users. Unused materials are not exported.
    pub users: u32,
    pub diffuse_color: Vec3,
    pub diffuse_intensity: f32,
    pub alpha: f32,
    pub specular_color: Vec3,
    pub specular_intensity: f32,
    pub specular_alpha: f32,
    /// Specular hardness in 1..=511.
    pub specular_hardness: f32,
    pub specular_ior: f32,
    pub ambient: f32,
    pub emit: f32,
    pub shadeless: bool,
    pub texture_slots: Vec<Option<TextureSlot>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            users: 1,
            diffuse_color: Vec3::splat(0.8),
            diffuse_intensity: 0.8,
            alpha: 1.0,
            specular_color: Vec3::ONE,
            specular_intensity: 0.5,
            specular_alpha: 1.0,
            specular_hardness: 50.0,
            specular_ior: 4.0,
            ambient: 1.0,
            emit: 0.0,
            shadeless: false,
            texture_slots: Vec::new(),
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }
}

/// Image referenced by a texture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub name: String,
    /// Absolute, or relative to the project file (optionally `//`-prefixed).
    pub filepath: PathBuf,
    /// Host file format name, e.g. `PNG`, `TARGA`, `OPEN_EXR`.
    pub file_format: String,
    /// Bits per pixel.
    pub depth: u16,
    /// Bytes packed into the project, used instead of reading the file.
    pub packed: Option<Vec<u8>>,
}

/// Texture datablock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texture {
    pub name: String,
    /// Backing image; `None` for procedural or empty image textures.
    pub image: Option<Image>,
}
