//! Hierarchy scheduler.
//!
//! Objects are emitted in non-decreasing parent depth, each preceded by its
//! own sub-chunks (constraint, collider, rigid body, vertex groups,
//! modifiers). Joints and modifiers may reference any object, including
//! ones emitted later, so object identifiers are predicted by a counting
//! pass before the real pass writes anything.

use std::collections::HashMap;
use std::io::{Seek, Write};

use smallvec::SmallVec;
use tracing::{debug, warn};

use super::context::{Category, ExportContext};
use super::cursor::Cursor;
use super::schema::object::{self, Datablock, Datablocks};
use super::schema::{modifier, physics, vertex_group};
use crate::chunk::{tags, ChunkWriter, NULL_REF};
use crate::scene::{ObjectData, Object};
use crate::util::{Error, Result};

/// Depth of every object in the parent forest, in input order.
fn depths(objects: &[Object]) -> Result<Vec<usize>> {
    let index: HashMap<&str, usize> =
        objects.iter().enumerate().map(|(i, ob)| (ob.name.as_str(), i)).collect();

    objects
        .iter()
        .map(|ob| {
            let mut depth = 0;
            let mut current = ob;
            while let Some(parent) = current.parent.as_deref() {
                let &i = index.get(parent).ok_or_else(|| Error::MissingParent {
                    object: current.name.clone(),
                    parent: parent.to_string(),
                })?;
                depth += 1;
                if depth > objects.len() {
                    return Err(Error::ParentCycle(ob.name.clone()));
                }
                current = &objects[i];
            }
            Ok(depth)
        })
        .collect()
}

/// Objects sorted by parent depth; ties keep their input order.
pub fn emission_order(objects: &[Object]) -> Result<Vec<&Object>> {
    let depths = depths(objects)?;
    let mut order: Vec<usize> = (0..objects.len()).collect();
    order.sort_by_key(|&i| depths[i]);
    Ok(order.into_iter().map(|i| &objects[i]).collect())
}

/// Sub-chunk identifiers written ahead of one object.
#[derive(Debug, Default)]
struct SubChunks {
    constraint: Option<Datablock>,
    collider: Option<u32>,
    rigid_body: Option<u32>,
    vertex_groups: SmallVec<[(usize, u32); 4]>,
    modifiers: SmallVec<[(usize, u32); 4]>,
}

/// Run both passes and write every object group.
///
/// Pass one registers the predicted object identifiers, pass two writes the
/// chunks and checks each object landed on its prediction.
pub fn write_objects<W: Write + Seek>(
    writer: &mut ChunkWriter<W>,
    ctx: &mut ExportContext<'_>,
) -> Result<()> {
    let scene = ctx.scene;
    let order = emission_order(&scene.objects)?;

    let mut cursor = Cursor::simulate(writer);
    for ob in &order {
        let id = write_object_group(&mut cursor, ctx, ob)?;
        ctx.registry.register(Category::Object, &ob.name, id);
    }
    debug!("Predicted {} object ids", order.len());

    let mut cursor = Cursor::emit(writer);
    for ob in &order {
        let actual = write_object_group(&mut cursor, ctx, ob)?;
        let predicted = ctx.registry.lookup(Category::Object, &ob.name)?;
        if actual != predicted {
            return Err(Error::SchedulerDivergence { object: ob.name.clone(), predicted, actual });
        }
    }
    Ok(())
}

/// Write (or count) the chunk group of one object and return its `OBJT` id.
///
/// Sub-chunks are registered only while emitting, so the counting pass
/// leaves no trace besides the object identifiers.
pub fn write_object_group<W: Write + Seek>(
    cursor: &mut Cursor<'_, W>,
    ctx: &mut ExportContext<'_>,
    ob: &Object,
) -> Result<u32> {
    let emitting = cursor.is_emitting();
    let mut sub = SubChunks::default();

    {
        let ctx: &ExportContext<'_> = ctx;
        let registry = &ctx.registry;

        if let Some(constraint) = &ob.rigid_body_constraint {
            match physics::joint_tag(&constraint.kind) {
                Some(tag) => {
                    let id = cursor.chunk(tag, physics::JOINT_VERSION, |w| {
                        let a = registry.object_ref(constraint.object1.as_deref())?;
                        let b = registry.object_ref(constraint.object2.as_deref())?;
                        physics::write_joint(w.stream(), constraint, a, b)
                    })?;
                    sub.constraint = Some(Datablock::new(tag, id));
                }
                None if emitting => {
                    warn!("{}: {:?} constraint is not exported", ob.name, constraint.kind)
                }
                None => {}
            }
        }

        if let Some(body) = &ob.rigid_body {
            let mesh_id = match (&ob.data, body.collision_shape.uses_mesh()) {
                (ObjectData::Mesh(name), true) => registry.get(Category::Mesh, name).unwrap_or(NULL_REF),
                _ => NULL_REF,
            };
            sub.collider = Some(cursor.chunk(tags::COLLIDER, physics::COLLIDER_VERSION, |w| {
                physics::write_collider(w.stream(), body, mesh_id)
            })?);
            sub.rigid_body = Some(cursor.chunk(tags::RIGID_BODY, physics::RIGID_BODY_VERSION, |w| {
                physics::write_rigid_body(w.stream(), body)
            })?);
        }

        for (index, group) in ob.vertex_groups.iter().enumerate() {
            let active = ob.active_vertex_group == Some(index);
            let id = cursor.chunk(tags::VERTEX_GROUP, vertex_group::VERSION, |w| {
                vertex_group::write_vertex_group(w.stream(), group, active)
            })?;
            sub.vertex_groups.push((index, id));
        }

        if ctx.options.preserves_modifiers() {
            for (index, m) in ob.modifiers.iter().enumerate() {
                let id = cursor.chunk(tags::MODIFIER, modifier::VERSION, |w| {
                    modifier::write_modifier(w.stream(), m, registry)
                })?;
                sub.modifiers.push((index, id));
            }
        }
    }

    let id = {
        let ctx: &ExportContext<'_> = ctx;
        let sub = &sub;
        cursor.chunk(tags::OBJECT, object::VERSION, |w| {
            let parent_id = ctx.registry.object_ref(ob.parent.as_deref())?;
            let blocks = datablocks(ctx, ob, sub)?;
            object::write_object(w.stream(), ob, parent_id, &blocks)
        })?
    };

    if emitting {
        register_sub_chunks(ctx, ob, &sub);
        debug!("Object {} -> id {}", ob.name, id);
    }
    Ok(id)
}

fn register_sub_chunks(ctx: &mut ExportContext<'_>, ob: &Object, sub: &SubChunks) {
    let registry = &mut ctx.registry;
    if let Some(block) = sub.constraint {
        registry.register(Category::Constraint, &ob.name, block.id);
    }
    if let Some(id) = sub.collider {
        registry.register(Category::Collider, &ob.name, id);
    }
    if let Some(id) = sub.rigid_body {
        registry.register(Category::RigidBody, &ob.name, id);
    }
    for &(index, id) in &sub.vertex_groups {
        let key = format!("{}/{}", ob.name, ob.vertex_groups[index].name);
        registry.register(Category::VertexGroup, &key, id);
    }
    for &(index, id) in &sub.modifiers {
        let key = format!("{}/{}", ob.name, ob.modifiers[index].name);
        registry.register(Category::Modifier, &key, id);
    }
}

/// Typed references of an object in `OBJT` order.
fn datablocks(ctx: &ExportContext<'_>, ob: &Object, sub: &SubChunks) -> Result<Datablocks> {
    let registry = &ctx.registry;
    let mut blocks = Datablocks::new();

    for material in ob.material_slots.iter().flatten() {
        blocks.push(Datablock::new(tags::MATERIAL, registry.lookup(Category::Material, material)?));
    }

    if let Some((category, tag, name)) = object::data_ref(&ob.data) {
        // Lights of kinds without a wire code were never written.
        let id = match category {
            Category::Light => registry.get(category, name),
            _ => Some(registry.lookup(category, name)?),
        };
        if let Some(id) = id {
            blocks.push(Datablock::new(tag, id));
        }
    }

    blocks.extend(sub.constraint);
    if let Some(id) = sub.collider {
        blocks.push(Datablock::new(tags::COLLIDER, id));
    }
    if let Some(id) = sub.rigid_body {
        blocks.push(Datablock::new(tags::RIGID_BODY, id));
    }
    for &(_, id) in &sub.vertex_groups {
        blocks.push(Datablock::new(tags::VERTEX_GROUP, id));
    }
    for &(_, id) in &sub.modifiers {
        blocks.push(Datablock::new(tags::MODIFIER, id));
    }

    if let Some(action) = &ob.action {
        blocks.push(Datablock::new(tags::ANIM, registry.lookup(Category::Action, action)?));
    }
    if let Some(id) = registry.get(Category::UserData, &ob.name) {
        blocks.push(Datablock::new(tags::USER, id));
    }
    Ok(blocks)
}
