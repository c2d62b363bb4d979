//! Camera writer (`CAMR`).

use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::scene::{Camera, Projection};
use crate::util::Result;

pub const VERSION: u32 = 2;

/// Empirical field-of-view conversion matching the target renderer.
const FOV_DIVISOR: f32 = 3.01675;
const FOV_SCALE: f32 = 172.847;

/// Field of view written for a perspective angle in radians.
#[inline]
pub fn renderer_fov(angle: f32) -> f32 {
    angle / FOV_DIVISOR * FOV_SCALE
}

/// Write the `CAMR` payload.
///
/// The depth-of-field target is stored by object name since objects are
/// written after cameras.
pub fn write_camera<W: Write + Seek>(out: &mut OStream<W>, camera: &Camera) -> Result<()> {
    match camera.projection {
        Projection::Orthographic { scale } => {
            out.write_u16(0)?;
            out.write_f32(camera.clip_start)?;
            out.write_f32(camera.clip_end)?;
            out.write_f32(scale)?;
        }
        Projection::Perspective { angle } => {
            out.write_u16(1)?;
            out.write_f32(camera.clip_start)?;
            out.write_f32(camera.clip_end)?;
            out.write_f32(renderer_fov(angle))?;
        }
    }
    out.write_f32(camera.sensor_width / camera.sensor_height)?;

    out.write_flag(camera.has_dof())?;
    if camera.has_dof() {
        out.write_f32(camera.dof_distance)?;
        out.write_string(camera.dof_object.as_deref().unwrap_or(""))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::PayloadReader;
    use std::io::Cursor;

    fn written(camera: &Camera) -> Vec<u8> {
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_camera(&mut out, camera).unwrap();
        out.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_perspective() -> Result<()> {
        let camera = Camera {
            projection: Projection::Perspective { angle: FOV_DIVISOR },
            sensor_width: 36.0,
            sensor_height: 24.0,
            ..Default::default()
        };
        let bytes = written(&camera);
        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_u16()?, 1);
        assert_eq!(r.read_f32()?, 0.1);
        assert_eq!(r.read_f32()?, 100.0);
        assert!((r.read_f32()? - FOV_SCALE).abs() < 1e-3);
        assert_eq!(r.read_f32()?, 1.5);
        assert_eq!(r.read_u16()?, 0);
        assert_eq!(r.pos(), bytes.len());
        Ok(())
    }

    #[test]
    fn test_ortho_with_dof_target() -> Result<()> {
        let camera = Camera {
            projection: Projection::Orthographic { scale: 7.5 },
            dof_object: Some("Target".into()),
            ..Default::default()
        };
        let bytes = written(&camera);
        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_u16()?, 0);
        r.skip(8);
        assert_eq!(r.read_f32()?, 7.5);
        r.skip(4);
        assert_eq!(r.read_u16()?, 1);
        assert_eq!(r.read_f32()?, 0.0);
        assert_eq!(r.read_string()?, "Target");
        Ok(())
    }
}
