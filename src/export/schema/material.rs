//! Texture (`TXTR`) and material (`MTRL`) writers.

use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::export::context::{Category, Registry};
use crate::export::resource::ResourceBlock;
use crate::scene::{Material, Texture, TextureSlot};
use crate::util::{Result, Vec4};

pub const TEXTURE_VERSION: u32 = 2;
pub const MATERIAL_VERSION: u32 = 2;

/// Material property a texture reference drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Channel {
    DiffuseColor = 0,
    DiffuseIntensity = 1,
    SpecularColor = 2,
    SpecularIntensity = 3,
    Hardness = 4,
    Displacement = 6,
    Translucency = 7,
    Ambient = 8,
    Emission = 9,
    Normal = 12,
}

/// Mapping channels a slot drives, in write order, with their factors.
pub fn slot_channels(slot: &TextureSlot) -> Vec<(Channel, f32)> {
    let translucency = slot.translucency.or(slot.alpha);
    [
        (Channel::DiffuseColor, slot.diffuse_color),
        (Channel::DiffuseIntensity, slot.diffuse_intensity),
        (Channel::SpecularColor, slot.specular_color),
        (Channel::SpecularIntensity, slot.specular_intensity),
        (Channel::Hardness, slot.hardness),
        (Channel::Displacement, slot.displacement),
        (Channel::Ambient, slot.ambient),
        (Channel::Translucency, translucency),
        (Channel::Normal, slot.normal),
        (Channel::Emission, slot.emission),
    ]
    .into_iter()
    .filter_map(|(channel, factor)| factor.map(|f| (channel, f)))
    .collect()
}

pub fn write_texture<W: Write + Seek>(
    out: &mut OStream<W>,
    texture: &Texture,
    resource: &ResourceBlock,
) -> Result<()> {
    out.write_string(&texture.name)?;
    resource.write(out)
}

/// Write the `MTRL` payload. Texture slots resolve against registered textures.
pub fn write_material<W: Write + Seek>(
    out: &mut OStream<W>,
    material: &Material,
    registry: &Registry,
) -> Result<()> {
    out.write_string(&material.name)?;

    let diffuse = material.diffuse_color * material.diffuse_intensity;
    let specular = material.specular_color * material.specular_intensity;
    out.write_vec4(diffuse.extend(material.alpha))?;
    out.write_vec4(specular.extend(material.specular_alpha))?;
    out.write_vec4(Vec4::W)?;
    out.write_vec4(Vec4::W)?;

    out.write_f32((material.specular_hardness - 1.0) / 511.0)?;
    out.write_f32(material.ambient)?;
    out.write_f32(if material.shadeless { 1.0 } else { material.emit })?;
    out.write_f32(material.specular_ior)?;

    let count_at = out.pos();
    out.write_u32(0)?;

    let mut count = 0u32;
    for slot in material.texture_slots.iter().flatten().filter(|s| s.enabled) {
        let texture_id = registry.lookup(Category::Texture, &slot.texture)?;
        for (channel, factor) in slot_channels(slot) {
            out.write_u32(texture_id)?;
            out.write_u16(channel as u16)?;
            out.write_u16(slot.blend.code())?;
            out.write_f32(factor)?;
            out.write_vec3(slot.offset)?;
            out.write_vec3(slot.scale)?;
            count += 1;
        }
    }
    out.patch_u32(count_at, count)
}
