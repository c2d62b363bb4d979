//! Rigid body (`RGDB`), collider (`COLL`) and joint (`FJNT`/`HJNT`/`SJNT`) writers.

use std::io::{Seek, Write};

use crate::chunk::{tags, OStream, Tag};
use crate::scene::{BodyType, ConstraintKind, RigidBody, RigidBodyConstraint};
use crate::util::Result;

pub const RIGID_BODY_VERSION: u32 = 2;
pub const COLLIDER_VERSION: u32 = 1;
pub const JOINT_VERSION: u32 = 1;

/// Chunk tag of a constraint kind, `None` for kinds that are not exported.
pub fn joint_tag(kind: &ConstraintKind) -> Option<&'static Tag> {
    match kind {
        ConstraintKind::Fixed => Some(tags::FIXED_JOINT),
        ConstraintKind::Hinge { .. } => Some(tags::HINGE_JOINT),
        ConstraintKind::GenericSpring { .. } => Some(tags::SPRING_JOINT),
        ConstraintKind::Point
        | ConstraintKind::Slider
        | ConstraintKind::Piston
        | ConstraintKind::Generic
        | ConstraintKind::Motor => None,
    }
}

pub fn write_rigid_body<W: Write + Seek>(out: &mut OStream<W>, body: &RigidBody) -> Result<()> {
    out.write_u16(match body.body_type {
        BodyType::Active => 0,
        BodyType::Passive => 1,
    })?;
    out.write_f32(body.mass)?;
    out.write_f32(body.linear_damping)?;
    out.write_f32(body.angular_damping)?;
    out.write_flag(body.enabled)?;
    out.write_flag(body.kinematic)?;
    out.write_flag(body.start_deactivated)
}

/// `mesh_id` is the collision mesh, or the null reference for primitives.
pub fn write_collider<W: Write + Seek>(out: &mut OStream<W>, body: &RigidBody, mesh_id: u32) -> Result<()> {
    out.write_u16(body.collision_shape.code())?;
    out.write_f32(body.collision_margin)?;
    out.write_f32(body.friction)?;
    out.write_f32(body.restitution)?;
    out.write_u32(mesh_id)
}

/// Write a joint payload. `object1`/`object2` are object identifiers.
pub fn write_joint<W: Write + Seek>(
    out: &mut OStream<W>,
    constraint: &RigidBodyConstraint,
    object1: u32,
    object2: u32,
) -> Result<()> {
    out.write_u32(object1)?;
    out.write_u32(object2)?;
    out.write_flag(constraint.enabled)?;
    out.write_flag(constraint.disable_collisions)?;
    out.write_flag(constraint.breakable)?;
    out.write_f32(constraint.breaking_threshold)?;

    match &constraint.kind {
        ConstraintKind::Hinge { limit } => {
            let (lower, upper) = limit.unwrap_or_default();
            out.write_flag(limit.is_some())?;
            out.write_f32(lower.to_degrees())?;
            out.write_f32(upper.to_degrees())?;
        }
        ConstraintKind::GenericSpring { springs } => {
            for axis in springs {
                out.write_flag(axis.enabled)?;
                out.write_f32(axis.stiffness)?;
                out.write_f32(axis.damping)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::PayloadReader;
    use crate::scene::{CollisionShape, SpringAxis};
    use std::io::Cursor;

    fn joint_bytes(kind: ConstraintKind) -> Vec<u8> {
        let c = RigidBodyConstraint { kind, ..Default::default() };
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_joint(&mut out, &c, 4, 9).unwrap();
        out.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_joint_tags() {
        assert_eq!(joint_tag(&ConstraintKind::Fixed), Some(tags::FIXED_JOINT));
        assert_eq!(joint_tag(&ConstraintKind::Hinge { limit: None }), Some(tags::HINGE_JOINT));
        assert_eq!(joint_tag(&ConstraintKind::Slider), None);
        assert_eq!(joint_tag(&ConstraintKind::Motor), None);
    }

    #[test]
    fn test_joint_bodies() -> Result<()> {
        let fixed = joint_bytes(ConstraintKind::Fixed);
        assert_eq!(fixed.len(), 8 + 6 + 4);
        let mut r = PayloadReader::new(&fixed);
        assert_eq!(r.read_u32()?, 4);
        assert_eq!(r.read_u32()?, 9);

        let hinge = joint_bytes(ConstraintKind::Hinge {
            limit: Some((-std::f32::consts::FRAC_PI_2, std::f32::consts::PI)),
        });
        let mut r = PayloadReader::new(&hinge[18..]);
        assert_eq!(r.read_u16()?, 1);
        assert!((r.read_f32()? + 90.0).abs() < 1e-4);
        assert!((r.read_f32()? - 180.0).abs() < 1e-4);

        let spring = joint_bytes(ConstraintKind::GenericSpring { springs: [SpringAxis::default(); 6] });
        assert_eq!(spring.len(), 18 + 6 * 10);
        Ok(())
    }

    #[test]
    fn test_collider_and_body() -> Result<()> {
        let body = RigidBody { collision_shape: CollisionShape::Sphere, ..Default::default() };
        let mut out = OStream::new(Cursor::new(Vec::new()));
        write_collider(&mut out, &body, 0)?;
        write_rigid_body(&mut out, &body)?;
        let bytes = out.into_inner()?.into_inner();
        assert_eq!(bytes.len(), 18 + 20);
        let mut r = PayloadReader::new(&bytes);
        assert_eq!(r.read_u16()?, 1);
        Ok(())
    }
}
