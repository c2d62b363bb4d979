//! Modifier writer (`MDFR`).

use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::export::context::Registry;
use crate::scene::{Modifier, ModifierKind};
use crate::util::{Result, Vec3};

pub const VERSION: u32 = 1;

/// Kind code of modifiers without a dedicated body.
pub const OTHER_KIND: u16 = 0xFFFF;

pub fn kind_code(kind: &ModifierKind) -> u16 {
    match kind {
        ModifierKind::Array { .. } => 0,
        ModifierKind::Mirror { .. } => 1,
        ModifierKind::Subdivision { .. } => 2,
        ModifierKind::Solidify { .. } => 3,
        ModifierKind::Bevel { .. } => 4,
        ModifierKind::Decimate { .. } => 5,
        ModifierKind::EdgeSplit { .. } => 6,
        ModifierKind::Triangulate => 7,
        ModifierKind::Other { .. } => OTHER_KIND,
    }
}

/// Write the `MDFR` payload. Referenced objects resolve to their identifiers.
pub fn write_modifier<W: Write + Seek>(
    out: &mut OStream<W>,
    modifier: &Modifier,
    registry: &Registry,
) -> Result<()> {
    out.write_string(&modifier.name)?;
    out.write_u16(kind_code(&modifier.kind))?;
    out.write_flag(modifier.show_viewport)?;
    out.write_flag(modifier.show_render)?;

    match &modifier.kind {
        ModifierKind::Array { count, relative_offset, constant_offset, offset_object, merge_threshold } => {
            out.write_u32(*count)?;
            write_optional_vec3(out, *relative_offset)?;
            write_optional_vec3(out, *constant_offset)?;
            out.write_u32(registry.object_ref(offset_object.as_deref())?)?;
            write_optional_f32(out, *merge_threshold)?;
        }
        ModifierKind::Mirror { axes, use_clip, merge_threshold, mirror_object } => {
            for &axis in axes {
                out.write_flag(axis)?;
            }
            out.write_flag(*use_clip)?;
            write_optional_f32(out, *merge_threshold)?;
            out.write_u32(registry.object_ref(mirror_object.as_deref())?)?;
        }
        ModifierKind::Subdivision { levels, render_levels } => {
            out.write_u16(*levels)?;
            out.write_u16(*render_levels)?;
        }
        ModifierKind::Solidify { thickness, offset } => {
            out.write_f32(*thickness)?;
            out.write_f32(*offset)?;
        }
        ModifierKind::Bevel { width, segments } => {
            out.write_f32(*width)?;
            out.write_u16(*segments)?;
        }
        ModifierKind::Decimate { ratio } => {
            out.write_f32(*ratio)?;
        }
        ModifierKind::EdgeSplit { split_angle, use_edge_sharp } => {
            write_optional_f32(out, split_angle.map(f32::to_degrees))?;
            out.write_flag(*use_edge_sharp)?;
        }
        ModifierKind::Triangulate => {}
        ModifierKind::Other { host_type } => {
            out.write_string(host_type)?;
        }
    }
    Ok(())
}

/// `u16 flag, vec3 value` with a zero value when unset.
fn write_optional_vec3<W: Write + Seek>(out: &mut OStream<W>, value: Option<Vec3>) -> Result<()> {
    out.write_flag(value.is_some())?;
    out.write_vec3(value.unwrap_or(Vec3::ZERO))
}

/// `u16 flag, f32 value` with a zero value when unset.
fn write_optional_f32<W: Write + Seek>(out: &mut OStream<W>, value: Option<f32>) -> Result<()> {
    out.write_flag(value.is_some())?;
    out.write_f32(value.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::PayloadReader;
    use crate::export::context::Category;
    use crate::util::Error;
    use std::io::Cursor;

    fn written(modifier: &Modifier, registry: &Registry) -> Result<Vec<u8>> {
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_modifier(&mut out, modifier, registry)?;
        Ok(out.into_inner()?.into_inner())
    }

    #[test]
    fn test_array_offset_object() -> Result<()> {
        let mut registry = Registry::new();
        registry.register(Category::Object, "Pivot", 42);
        let m = Modifier::new(
            "Array",
            ModifierKind::Array {
                count: 4,
                relative_offset: Some(Vec3::X),
                constant_offset: None,
                offset_object: Some("Pivot".into()),
                merge_threshold: None,
            },
        );
        let bytes = written(&m, &registry)?;
        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_string()?, "Array");
        assert_eq!(r.read_u16()?, 0);
        r.skip(4);
        assert_eq!(r.read_u32()?, 4);
        assert_eq!(r.read_u16()?, 1);
        assert_eq!(r.read_f32()?, 1.0);
        r.skip(8);
        assert_eq!(r.read_u16()?, 0);
        r.skip(12);
        assert_eq!(r.read_u32()?, 42);
        assert_eq!(r.read_u16()?, 0);
        r.skip(4);
        assert_eq!(r.pos(), bytes.len());
        Ok(())
    }

    #[test]
    fn test_unknown_offset_object_is_fatal() {
        let m = Modifier::new(
            "Mirror",
            ModifierKind::Mirror {
                axes: [true, false, false],
                use_clip: false,
                merge_threshold: None,
                mirror_object: Some("Ghost".into()),
            },
        );
        let err = written(&m, &Registry::new()).unwrap_err();
        assert!(matches!(err, Error::Unregistered { category: "object", .. }));
    }

    #[test]
    fn test_other_kind() -> Result<()> {
        let m = Modifier::new("Wave", ModifierKind::Other { host_type: "WAVE".into() });
        let bytes = written(&m, &Registry::new())?;
        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_string()?, "Wave");
        assert_eq!(r.read_u16()?, OTHER_KIND);
        r.skip(4);
        assert_eq!(r.read_string()?, "WAVE");
        Ok(())
    }
}
