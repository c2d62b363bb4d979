//! File header, world settings and key/value metadata.

use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::scene::{MistFalloff, World};
use crate::util::Result;

pub const FILE_VERSION: u32 = 1;
pub const SCENE_VERSION: u32 = 1;
pub const META_VERSION: u32 = 1;

/// Feature set advertised by the `FILE` chunk.
pub const FEATURE_SET: u16 = 1;

/// Write the `FILE` payload.
pub fn write_file_header<W: Write + Seek>(out: &mut OStream<W>) -> Result<()> {
    out.write_u16(FEATURE_SET)
}

/// Write the `SCNE` payload.
pub fn write_world<W: Write + Seek>(out: &mut OStream<W>, world: &World) -> Result<()> {
    out.write_string(&world.name)?;
    out.write_rgb_opaque(world.ambient_color)?;
    out.write_rgb_opaque(world.zenith_color)?;
    out.write_rgb_opaque(world.horizon_color)?;

    out.write_flag(world.mist.is_some())?;
    if let Some(mist) = &world.mist {
        // fog takes the horizon color
        out.write_rgb_opaque(world.horizon_color)?;
        out.write_f32(mist.intensity)?;
        out.write_f32(mist.start)?;
        out.write_f32(mist.depth)?;
        out.write_f32(mist.height)?;
        out.write_flag(mist.falloff == MistFalloff::Quadratic)?;
    }
    Ok(())
}

/// Write a `META`/`USER` payload.
pub fn write_pairs<'p, W, I>(out: &mut OStream<W>, pairs: I) -> Result<()>
where
    W: Write + Seek,
    I: IntoIterator<Item = (&'p str, &'p str)>,
    I::IntoIter: ExactSizeIterator,
{
    let pairs = pairs.into_iter();
    out.write_u32(pairs.len() as u32)?;
    for (key, value) in pairs {
        out.write_string(key)?;
        out.write_string(value)?;
    }
    Ok(())
}
