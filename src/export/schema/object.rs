//! Object writer (`OBJT`).
//!
//! Every datablock an object links to is stored as a typed reference
//! (`tag kind, u32 id`), so a reader can tell a mesh from a material
//! without knowing the emission order.

use std::io::{Seek, Write};

use smallvec::SmallVec;

use crate::chunk::{tags, OStream, Tag};
use crate::export::context::Category;
use crate::scene::{Object, ObjectData};
use crate::util::{Error, Result};

pub const VERSION: u32 = 3;

/// Bits of the scene layer mask.
pub const LAYER_MASK: u32 = (1 << 20) - 1;

/// Typed reference to another chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datablock {
    pub tag: &'static Tag,
    pub id: u32,
}

impl Datablock {
    pub fn new(tag: &'static Tag, id: u32) -> Self {
        Self { tag, id }
    }
}

/// Datablocks of one object, in write order.
pub type Datablocks = SmallVec<[Datablock; 8]>;

/// Registry category, chunk tag and name of an object's data.
pub fn data_ref(data: &ObjectData) -> Option<(Category, &'static Tag, &str)> {
    match data {
        ObjectData::Empty => None,
        ObjectData::Mesh(name) => Some((Category::Mesh, tags::MESH, name)),
        ObjectData::Curve(name) => Some((Category::Curve, tags::SPLINE, name)),
        ObjectData::Armature(name) => Some((Category::Armature, tags::SKELETON, name)),
        ObjectData::Light(name) => Some((Category::Light, tags::LIGHT, name)),
        ObjectData::Camera(name) => Some((Category::Camera, tags::CAMERA, name)),
        ObjectData::Speaker(name) => Some((Category::Speaker, tags::SPEAKER, name)),
    }
}

/// Write the `OBJT` payload.
pub fn write_object<W: Write + Seek>(
    out: &mut OStream<W>,
    object: &Object,
    parent_id: u32,
    datablocks: &[Datablock],
) -> Result<()> {
    let count = u16::try_from(datablocks.len())
        .map_err(|_| Error::invalid(format!("object {:?} has too many datablocks", object.name)))?;

    out.write_string(&object.name)?;
    out.write_vec3(object.location)?;
    out.write_vec3(object.rotation_euler * (180.0 / std::f32::consts::PI))?;
    out.write_vec3(object.scale)?;
    out.write_u32(parent_id)?;
    out.write_u32(object.layers & LAYER_MASK)?;
    out.write_flag(object.visible)?;
    out.write_flag(object.selected)?;

    out.write_u16(count)?;
    for block in datablocks {
        out.write_tag(block.tag)?;
        out.write_u32(block.id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::PayloadReader;
    use crate::util::Vec3;
    use std::io::Cursor;

    #[test]
    fn test_object_payload() -> Result<()> {
        let mut ob = Object::new("Cube", ObjectData::Mesh("CubeMesh".into()));
        ob.rotation_euler = Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0);
        ob.layers = 0xFFFF_FFFF;

        let blocks = [Datablock::new(tags::MATERIAL, 3), Datablock::new(tags::MESH, 4)];
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_object(&mut out, &ob, 9, &blocks)?;
        let bytes = out.into_inner()?.into_inner();

        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_string()?, "Cube");
        r.skip(12);
        assert!((r.read_f32()? - 90.0).abs() < 1e-4);
        r.skip(8 + 12);
        assert_eq!(r.read_u32()?, 9);
        assert_eq!(r.read_u32()?, LAYER_MASK);
        assert_eq!(r.read_u16()?, 1);
        assert_eq!(r.read_u16()?, 0);
        assert_eq!(r.read_u16()?, 2);
        assert_eq!(&r.read_tag()?, tags::MATERIAL);
        assert_eq!(r.read_u32()?, 3);
        assert_eq!(&r.read_tag()?, tags::MESH);
        assert_eq!(r.read_u32()?, 4);
        assert_eq!(r.pos(), bytes.len());
        Ok(())
    }

    #[test]
    fn test_data_refs() {
        assert_eq!(data_ref(&ObjectData::Empty), None);
        let data = ObjectData::Curve("Path".into());
        let (category, tag, name) = data_ref(&data).unwrap();
        assert_eq!(category, Category::Curve);
        assert_eq!(tag, tags::SPLINE);
        assert_eq!(name, "Path");
    }
}
