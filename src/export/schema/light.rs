//! Light writer (`LGHT`).

use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::scene::{Light, LightKind};
use crate::util::Result;

pub const VERSION: u32 = 1;

/// Wire code of a light kind, `None` for kinds that are not exported.
pub fn kind_code(kind: &LightKind) -> Option<u16> {
    match kind {
        LightKind::Point => Some(0),
        LightKind::Spot { .. } => Some(1),
        LightKind::Sun => Some(2),
        LightKind::Area { .. } => Some(3),
        LightKind::Hemi => None,
    }
}

/// Write the `LGHT` payload of an exportable light.
pub fn write_light<W: Write + Seek>(out: &mut OStream<W>, light: &Light, code: u16) -> Result<()> {
    out.write_u16(code)?;
    out.write_rgb_opaque(light.color)?;
    out.write_f32(light.energy)?;

    out.write_flag(light.shadow.is_some())?;
    if let Some(shadow) = &light.shadow {
        out.write_rgb_opaque(shadow.color)?;
        out.write_f32(shadow.soft_size)?;
    }

    match light.kind {
        LightKind::Point => {
            out.write_f32(light.distance)?;
        }
        LightKind::Spot { spot_size, spot_blend } => {
            let angle = spot_size.to_degrees();
            out.write_f32(light.distance)?;
            out.write_f32(angle)?;
            out.write_f32(angle * (1.0 - spot_blend))?;
        }
        LightKind::Area { size, size_y } => {
            out.write_f32(light.distance)?;
            out.write_f32(size)?;
            out.write_f32(size_y.unwrap_or(size))?;
        }
        LightKind::Sun | LightKind::Hemi => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::PayloadReader;
    use crate::scene::Shadow;
    use crate::util::Vec3;
    use std::io::Cursor;

    fn written(light: &Light) -> Vec<u8> {
        let code = kind_code(&light.kind).unwrap();
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_light(&mut out, light, code).unwrap();
        out.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_hemi_is_skipped() {
        assert_eq!(kind_code(&LightKind::Hemi), None);
        assert_eq!(kind_code(&LightKind::Sun), Some(2));
    }

    #[test]
    fn test_spot_angles() -> Result<()> {
        let light = Light {
            kind: LightKind::Spot { spot_size: std::f32::consts::FRAC_PI_2, spot_blend: 0.25 },
            ..Default::default()
        };
        let bytes = written(&light);
        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_u16()?, 1);
        r.skip(16 + 4);
        assert_eq!(r.read_u16()?, 0);
        assert_eq!(r.read_f32()?, 25.0);
        assert!((r.read_f32()? - 90.0).abs() < 1e-4);
        assert!((r.read_f32()? - 67.5).abs() < 1e-4);
        assert_eq!(r.pos(), bytes.len());
        Ok(())
    }

    #[test]
    fn test_square_area_with_shadow() -> Result<()> {
        let light = Light {
            kind: LightKind::Area { size: 2.0, size_y: None },
            shadow: Some(Shadow { color: Vec3::ZERO, soft_size: 0.5 }),
            ..Default::default()
        };
        let bytes = written(&light);
        // code, rgba, energy, flag, rgba, soft, distance, x, y
        assert_eq!(bytes.len(), 2 + 16 + 4 + 2 + 16 + 4 + 4 + 8);
        let mut r = PayloadReader::new(&bytes[bytes.len() - 8..]);
        assert_eq!(r.read_f32()?, 2.0);
        assert_eq!(r.read_f32()?, 2.0);
        Ok(())
    }

    #[test]
    fn test_sun_has_no_distance() {
        let light = Light { kind: LightKind::Sun, ..Default::default() };
        assert_eq!(written(&light).len(), 2 + 16 + 4 + 2);
    }
}
