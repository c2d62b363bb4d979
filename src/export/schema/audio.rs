//! Sound (`AUDF`) and speaker (`AUDS`) writers.

use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::export::resource::ResourceBlock;
use crate::scene::{Sound, Speaker};
use crate::util::Result;

pub const SOUND_VERSION: u32 = 2;
pub const SPEAKER_VERSION: u32 = 1;

/// Speaker sound reference when no sound is assigned.
pub const NO_SOUND: i32 = -1;

pub fn write_sound<W: Write + Seek>(
    out: &mut OStream<W>,
    sound: &Sound,
    resource: &ResourceBlock,
) -> Result<()> {
    out.write_string(&sound.name)?;
    resource.write(out)
}

/// `sound_id` is the identifier of the speaker's sound chunk, or [`NO_SOUND`].
pub fn write_speaker<W: Write + Seek>(
    out: &mut OStream<W>,
    speaker: &Speaker,
    sound_id: i32,
) -> Result<()> {
    out.write_f32(speaker.volume)?;
    out.write_f32(speaker.pitch)?;
    out.write_f32(speaker.attenuation)?;
    out.write_f32(speaker.volume_min)?;
    out.write_f32(speaker.volume_max)?;
    out.write_f32(speaker.distance_reference)?;
    out.write_f32(speaker.distance_max)?;
    out.write_f32(speaker.cone_angle_outer)?;
    out.write_f32(speaker.cone_angle_inner)?;
    out.write_flag(speaker.muted)?;
    out.write_i32(sound_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_speaker_without_sound() -> Result<()> {
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_speaker(&mut out, &Speaker::default(), NO_SOUND)?;
        let bytes = out.into_inner()?.into_inner();
        assert_eq!(bytes.len(), 9 * 4 + 2 + 4);
        assert_eq!(&bytes[bytes.len() - 4..], &(-1i32).to_le_bytes());
        Ok(())
    }
}
