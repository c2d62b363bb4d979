//! Armature (`SKEL`) and curve (`SPLN` + nested `CURV`) writers.

use std::collections::HashMap;
use std::io::{Seek, Write};

use crate::chunk::OStream;
use crate::scene::{Armature, Curve, Spline, SplineKind};
use crate::util::{Error, Result};

pub const SKELETON_VERSION: u32 = 1;
pub const SPLINE_VERSION: u32 = 2;
pub const CURVE_VERSION: u32 = 1;

/// Parent index of a root bone.
const ROOT_BONE: i16 = -1;

/// Write the `SKEL` payload. Parents are local indices within the armature.
pub fn write_armature<W: Write + Seek>(out: &mut OStream<W>, armature: &Armature) -> Result<()> {
    let count = u16::try_from(armature.bones.len())
        .map_err(|_| Error::invalid(format!("armature {:?} has too many bones", armature.name)))?;
    let local: HashMap<&str, i16> = armature
        .bones
        .iter()
        .enumerate()
        .map(|(i, b)| (b.name.as_str(), i as i16))
        .collect();

    out.write_u16(count)?;
    for bone in &armature.bones {
        let parent = match &bone.parent {
            Some(name) => *local.get(name.as_str()).ok_or_else(|| {
                Error::invalid(format!(
                    "bone {:?} of armature {:?} has unknown parent {:?}",
                    bone.name, armature.name, name
                ))
            })?,
            None => ROOT_BONE,
        };
        out.write_string(&bone.name)?;
        out.write_i16(parent)?;
        out.write_vec3(bone.head)?;
        out.write_vec3(bone.tail)?;
        out.write_f32(bone.roll)?;
    }
    Ok(())
}

/// Write the `SPLN` header. One `CURV` chunk per spline follows inside it.
pub fn write_curve_header<W: Write + Seek>(out: &mut OStream<W>, curve: &Curve) -> Result<()> {
    out.write_string(&curve.name)?;
    out.write_u32(curve.splines.len() as u32)
}

/// Write one `CURV` payload.
pub fn write_spline<W: Write + Seek>(out: &mut OStream<W>, spline: &Spline) -> Result<()> {
    let bezier = spline.kind == SplineKind::Bezier;
    out.write_u16(spline.kind.code())?;
    out.write_u16(spline.tilt_interpolation.code())?;
    out.write_u32(spline.points.len() as u32)?;
    for point in &spline.points {
        out.write_vec3(point.co)?;
        out.write_f32(point.radius)?;
        out.write_f32(point.tilt)?;
        out.write_f32(if bezier { 0.0 } else { point.weight })?;
        if bezier {
            out.write_vec3(point.handle_left)?;
            out.write_vec3(point.handle_right)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::PayloadReader;
    use crate::scene::{Bone, SplinePoint};
    use crate::util::Vec3;
    use std::io::Cursor;

    fn bone(name: &str, parent: Option<&str>) -> Bone {
        Bone {
            name: name.into(),
            parent: parent.map(str::to_string),
            tail: Vec3::Z,
            ..Default::default()
        }
    }

    #[test]
    fn test_local_parent_indices() -> Result<()> {
        let armature = Armature {
            name: "Rig".into(),
            bones: vec![bone("Root", None), bone("Spine", Some("Root")), bone("Head", Some("Spine"))],
        };
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_armature(&mut out, &armature)?;
        let bytes = out.into_inner()?.into_inner();

        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_u16()?, 3);
        let mut parents = Vec::new();
        for _ in 0..3 {
            r.read_string()?;
            parents.push(r.read_i16()?);
            r.skip(28);
        }
        assert_eq!(parents, vec![-1, 0, 1]);
        assert_eq!(r.pos(), bytes.len());
        Ok(())
    }

    #[test]
    fn test_unknown_parent_bone() {
        let armature = Armature { name: "Rig".into(), bones: vec![bone("Arm", Some("Ghost"))] };
        let mut out = OStream::new(Cursor::new(Vec::new()));
        assert!(write_armature(&mut out, &armature).is_err());
    }

    #[test]
    fn test_spline_point_layouts() -> Result<()> {
        let points = vec![SplinePoint { weight: 0.5, ..Default::default() }; 2];
        let poly = Spline { points: points.clone(), ..Default::default() };
        let bezier = Spline { kind: SplineKind::Bezier, points, ..Default::default() };

        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_spline(&mut out, &poly)?;
        let poly_len = out.pos();
        write_spline(&mut out, &bezier)?;
        let bytes = out.into_inner()?.into_inner();

        assert_eq!(poly_len, 8 + 2 * 24);
        assert_eq!(bytes.len() as u64 - poly_len, 8 + 2 * 48);

        let mut r = PayloadReader::new(&bytes[poly_len as usize..]);
        assert_eq!(r.read_u16()?, SplineKind::Bezier.code());
        r.skip(6 + 12 + 8);
        assert_eq!(r.read_f32()?, 0.0, "bezier weight is zeroed");
        Ok(())
    }
}
