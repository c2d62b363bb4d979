//! Export orchestrator.
//!
//! Categories are written in a fixed order so that every reference points
//! backwards, except the object hierarchy which resolves its own forward
//! references in two passes (see [`super::scheduler`]).

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::context::{Category, ExportContext};
use super::options::{ExportOptions, ModifierMode};
use super::resource::ResourceResolver;
use super::scheduler;
use super::schema::{animation, audio, camera, light, material, mesh, rig, scene as scene_schema};
use crate::chunk::{tags, ChunkWriter, OStream, Tag};
use crate::scene::{BakedEvaluator, MeshEvaluator, Scene, World};
use crate::util::{Error, Result};

/// Package stamp recorded in the run metadata.
const PACKAGE: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
const BUILD_DATE: &str = env!("SCN_BUILD_DATE");

/// Write buffer for file exports.
const FILE_BUFFER_SIZE: usize = 1 << 20;

/// Summary of a finished export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    /// Chunks written, which is also the highest identifier plus one.
    pub chunks: u32,
    /// Total file size in bytes.
    pub bytes: u64,
}

/// Serializes a [`Scene`] into an SCN container.
///
/// # Example
///
/// ```ignore
/// use scn::export::{Exporter, ExportOptions};
/// use scn::scene::Scene;
///
/// let scene = Scene::from_json_reader(std::fs::File::open("level.json")?)?;
/// let stats = Exporter::new(&scene)
///     .with_options(ExportOptions::new().with_embed_resources(true))
///     .export_to_path("level.scn")?;
/// println!("{} chunks", stats.chunks);
/// ```
pub struct Exporter<'a> {
    scene: &'a Scene,
    options: ExportOptions,
    evaluator: &'a dyn MeshEvaluator,
}

impl<'a> Exporter<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene, options: ExportOptions::default(), evaluator: &BakedEvaluator }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the evaluator used when modifiers are applied.
    pub fn with_evaluator(mut self, evaluator: &'a dyn MeshEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    #[inline]
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export into any seekable sink and hand it back.
    ///
    /// The sink must be empty; a sink that already holds bytes is rejected
    /// instead of being partly overwritten.
    ///
    /// Without an output path, output-relative resource paths fall back
    /// to absolute ones.
    pub fn export_to_writer<W: Write + Seek>(&self, sink: W) -> Result<W> {
        let (sink, _) = self.run(sink, None)?;
        Ok(sink)
    }

    /// Export to a file.
    ///
    /// The container is written to a temporary file in the destination
    /// directory and renamed over `path` only once it is complete, so a
    /// failed run never leaves a truncated file behind.
    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<ExportStats> {
        let path = path.as_ref();
        info!("Exporting to {}", path.display());

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        let stats = {
            let sink: BufWriter<&mut File> = BufWriter::with_capacity(FILE_BUFFER_SIZE, tmp.as_file_mut());
            let (_, stats) = self.run(sink, Some(path))?;
            stats
        };
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        info!("Wrote {} chunks ({} bytes)", stats.chunks, stats.bytes);
        Ok(stats)
    }

    fn run<W: Write + Seek>(&self, sink: W, output_path: Option<&Path>) -> Result<(W, ExportStats)> {
        let resources = ResourceResolver::new(
            &self.options,
            self.scene.info.project_path.as_deref(),
            output_path,
        );
        let mut ctx = ExportContext::new(self.scene, &self.options, resources, self.evaluator);
        let mut w = ChunkWriter::new(OStream::new_empty(sink)?)?;

        write_header(&mut w, &ctx)?;
        write_actions(&mut w, &mut ctx)?;
        write_sounds(&mut w, &mut ctx)?;
        write_speakers(&mut w, &mut ctx)?;
        write_lights(&mut w, &mut ctx)?;
        write_cameras(&mut w, &mut ctx)?;
        write_textures(&mut w, &mut ctx)?;
        write_materials(&mut w, &mut ctx)?;
        write_armatures(&mut w, &mut ctx)?;
        write_curves(&mut w, &mut ctx)?;
        write_meshes(&mut w, &mut ctx)?;
        write_user_data(&mut w, &mut ctx)?;

        scheduler::write_objects(&mut w, &mut ctx)?;
        info!("Wrote {} objects", ctx.registry.len(Category::Object));

        let chunks = w.ids().issued();
        let stream = w.finish()?;
        let bytes = stream.pos();
        debug!("Container complete: {} chunks, {} bytes", chunks, bytes);
        Ok((stream.into_inner()?, ExportStats { chunks, bytes }))
    }
}

/// `FILE`, `SCNE` and `META`.
fn write_header<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &ExportContext<'_>) -> Result<()> {
    w.chunk(tags::FILE, scene_schema::FILE_VERSION, |w| scene_schema::write_file_header(w.stream()))?;

    let fallback = World::default();
    let world = ctx.scene.worlds.first().unwrap_or(&fallback);
    w.chunk(tags::SCENE, scene_schema::SCENE_VERSION, |w| {
        scene_schema::write_world(w.stream(), world)
    })?;

    let pairs = run_metadata(ctx);
    write_pairs_chunk(w, tags::META, scene_schema::META_VERSION, &pairs)?;
    Ok(())
}

/// Key/value pairs describing this run.
fn run_metadata(ctx: &ExportContext<'_>) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("exporter", ctx.scene.info.application.clone()),
        ("package", format!("{} (built {})", PACKAGE, BUILD_DATE)),
    ];
    if let Some(name) = ctx.scene.info.project_path.as_deref().and_then(Path::file_name) {
        pairs.push(("source", name.to_string_lossy().into_owned()));
    }
    if let Some(author) = ctx.options.author.as_deref().filter(|a| !a.is_empty()) {
        pairs.push(("author", author.to_string()));
    }
    pairs
}

/// Write a pair chunk, or nothing at all when there are no pairs.
fn write_pairs_chunk<W, K, V>(
    w: &mut ChunkWriter<W>,
    tag: &Tag,
    version: u32,
    pairs: &[(K, V)],
) -> Result<Option<u32>>
where
    W: Write + Seek,
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return Ok(None);
    }
    let id = w.chunk(tag, version, |w| {
        scene_schema::write_pairs(w.stream(), pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
    })?;
    Ok(Some(id))
}

fn write_actions<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for action in &scene.actions {
        let id = w.chunk(tags::ANIM, animation::VERSION, |w| {
            animation::write_action(w.stream(), action, scene.info.fps)
        })?;
        ctx.registry.register(Category::Action, &action.name, id);
        debug!("Action {} -> id {}", action.name, id);
    }
    info!("Wrote {} actions", scene.actions.len());
    Ok(())
}

fn write_sounds<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for sound in &scene.sounds {
        let resource = ctx.resources.sound(sound)?;
        let id = w.chunk(tags::SOUND, audio::SOUND_VERSION, |w| {
            audio::write_sound(w.stream(), sound, &resource)
        })?;
        ctx.registry.register(Category::Sound, &sound.name, id);
        debug!("Sound {} -> id {}", sound.name, id);
    }
    info!("Wrote {} sounds", scene.sounds.len());
    Ok(())
}

fn write_speakers<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for speaker in &scene.speakers {
        let sound_id = match speaker.sound.as_deref() {
            Some(name) => i32::try_from(ctx.registry.lookup(Category::Sound, name)?)
                .map_err(|_| Error::other("sound identifier out of range"))?,
            None => audio::NO_SOUND,
        };
        let id = w.chunk(tags::SPEAKER, audio::SPEAKER_VERSION, |w| {
            audio::write_speaker(w.stream(), speaker, sound_id)
        })?;
        ctx.registry.register(Category::Speaker, &speaker.name, id);
        debug!("Speaker {} -> id {}", speaker.name, id);
    }
    info!("Wrote {} speakers", scene.speakers.len());
    Ok(())
}

fn write_lights<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for lamp in &scene.lights {
        let Some(code) = light::kind_code(&lamp.kind) else {
            warn!("Light {}: {:?} lights are not exported", lamp.name, lamp.kind);
            continue;
        };
        let id = w.chunk(tags::LIGHT, light::VERSION, |w| light::write_light(w.stream(), lamp, code))?;
        ctx.registry.register(Category::Light, &lamp.name, id);
        debug!("Light {} -> id {}", lamp.name, id);
    }
    info!("Wrote {} lights", ctx.registry.len(Category::Light));
    Ok(())
}

fn write_cameras<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for cam in &scene.cameras {
        let id = w.chunk(tags::CAMERA, camera::VERSION, |w| camera::write_camera(w.stream(), cam))?;
        ctx.registry.register(Category::Camera, &cam.name, id);
        debug!("Camera {} -> id {}", cam.name, id);
    }
    info!("Wrote {} cameras", scene.cameras.len());
    Ok(())
}

fn write_textures<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for texture in &scene.textures {
        let resource = ctx.resources.texture(texture)?;
        let id = w.chunk(tags::TEXTURE, material::TEXTURE_VERSION, |w| {
            material::write_texture(w.stream(), texture, &resource)
        })?;
        ctx.registry.register(Category::Texture, &texture.name, id);
        debug!("Texture {} -> id {}", texture.name, id);
    }
    info!("Wrote {} textures", scene.textures.len());
    Ok(())
}

fn write_materials<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for mat in scene.materials.iter().filter(|m| m.users > 0) {
        let registry = &ctx.registry;
        let id = w.chunk(tags::MATERIAL, material::MATERIAL_VERSION, |w| {
            material::write_material(w.stream(), mat, registry)
        })?;
        ctx.registry.register(Category::Material, &mat.name, id);
        debug!("Material {} -> id {}", mat.name, id);
    }
    info!("Wrote {} materials", ctx.registry.len(Category::Material));
    Ok(())
}

fn write_armatures<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for armature in &scene.armatures {
        let id = w.chunk(tags::SKELETON, rig::SKELETON_VERSION, |w| {
            rig::write_armature(w.stream(), armature)
        })?;
        ctx.registry.register(Category::Armature, &armature.name, id);
        debug!("Armature {} -> id {} ({} bones)", armature.name, id, armature.bones.len());
    }
    info!("Wrote {} armatures", scene.armatures.len());
    Ok(())
}

/// `SPLN` chunks, each holding one nested `CURV` chunk per spline.
fn write_curves<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for curve in &scene.curves {
        let id = w.chunk(tags::SPLINE, rig::SPLINE_VERSION, |w| {
            rig::write_curve_header(w.stream(), curve)?;
            for spline in &curve.splines {
                w.chunk(tags::CURVE, rig::CURVE_VERSION, |w| rig::write_spline(w.stream(), spline))?;
            }
            Ok(())
        })?;
        ctx.registry.register(Category::Curve, &curve.name, id);
        debug!("Curve {} -> id {} ({} splines)", curve.name, id, curve.splines.len());
    }
    info!("Wrote {} curves", scene.curves.len());
    Ok(())
}

fn write_meshes<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    let apply = ctx.options.modifier_mode == ModifierMode::Apply;

    for m in scene.meshes.iter().filter(|m| m.users > 0) {
        // Shared meshes cannot carry one object's modifiers.
        let owner = if apply && m.users == 1 { scene.mesh_users(&m.name).next() } else { None };
        let geometry = match owner {
            Some(ob) => ctx.evaluator.evaluate(scene, ob, m)?,
            None => Cow::Borrowed(m),
        };

        let id = w.chunk(tags::MESH, mesh::VERSION, |w| mesh::write_mesh(w.stream(), m, &geometry))?;
        ctx.registry.register(Category::Mesh, &m.name, id);
        debug!(
            "Mesh {} -> id {} ({} verts, {} faces)",
            m.name,
            id,
            geometry.vertices.len(),
            geometry.faces.len()
        );
    }
    info!("Wrote {} meshes", ctx.registry.len(Category::Mesh));
    Ok(())
}

/// One `USER` chunk per object with exportable custom properties.
fn write_user_data<W: Write + Seek>(w: &mut ChunkWriter<W>, ctx: &mut ExportContext<'_>) -> Result<()> {
    let scene = ctx.scene;
    for ob in &scene.objects {
        let pairs: Vec<(&str, &str)> = ob.user_properties().collect();
        if let Some(id) = write_pairs_chunk(w, tags::USER, scene_schema::META_VERSION, &pairs)? {
            ctx.registry.register(Category::UserData, &ob.name, id);
            debug!("User data of {} -> id {} ({} pairs)", ob.name, id, pairs.len());
        }
    }
    info!("Wrote {} user data blocks", ctx.registry.len(Category::UserData));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkReader;
    use crate::scene::{Light, LightKind, Mesh, Object, ObjectData};
    use std::io::Cursor;

    fn export(scene: &Scene, options: ExportOptions) -> Result<Vec<u8>> {
        let sink = Exporter::new(scene).with_options(options).export_to_writer(Cursor::new(Vec::new()))?;
        Ok(sink.into_inner())
    }

    #[test]
    fn test_empty_scene() -> Result<()> {
        let bytes = export(&Scene::new(), ExportOptions::default())?;
        let reader = ChunkReader::new(&bytes)?;
        let chunks = reader.chunks()?;
        let tags_written: Vec<_> = chunks.iter().map(|c| c.tag).collect();
        assert_eq!(tags_written, vec![*tags::FILE, *tags::SCENE, *tags::META]);
        assert_eq!(chunks[0].id, 0);
        assert_eq!(reader.root_len() as usize, bytes.len() - 8);
        Ok(())
    }

    #[test]
    fn test_run_metadata() -> Result<()> {
        let mut scene = Scene::new();
        scene.info.application = "Host 2.79".into();
        scene.info.project_path = Some("/work/project/level.blend".into());
        let bytes = export(&scene, ExportOptions::new().with_author("jo"))?;

        let reader = ChunkReader::new(&bytes)?;
        let meta = reader.chunks()?.into_iter().find(|c| &c.tag == tags::META).unwrap();
        let mut r = reader.payload_reader(&meta);
        assert_eq!(r.read_u32()?, 4);
        assert_eq!(r.read_string()?, "exporter");
        assert_eq!(r.read_string()?, "Host 2.79");
        assert_eq!(r.read_string()?, "package");
        assert!(r.read_string()?.starts_with("scn "));
        assert_eq!(r.read_string()?, "source");
        assert_eq!(r.read_string()?, "level.blend");
        assert_eq!(r.read_string()?, "author");
        assert_eq!(r.read_string()?, "jo");
        Ok(())
    }

    #[test]
    fn test_unused_mesh_skipped() -> Result<()> {
        let mut scene = Scene::new();
        let mut orphan = Mesh::cube("Orphan");
        orphan.users = 0;
        scene.meshes.push(orphan);
        let bytes = export(&scene, ExportOptions::default())?;
        let reader = ChunkReader::new(&bytes)?;
        assert!(reader.chunks()?.iter().all(|c| &c.tag != tags::MESH));
        Ok(())
    }

    #[test]
    fn test_applied_modifiers_use_evaluated_geometry() -> Result<()> {
        let mut scene = Scene::new();
        scene.meshes.push(Mesh::cube("Box"));
        scene.objects.push(Object::new("Box", ObjectData::Mesh("Box".into())));
        let mut baked = Mesh::cube("Box");
        baked.vertices.truncate(4);
        baked.faces.truncate(1);
        scene.evaluated_meshes.insert("Box".into(), baked);

        let bytes = export(&scene, ExportOptions::new().with_modifier_mode(ModifierMode::Apply))?;
        let reader = ChunkReader::new(&bytes)?;
        let chunk = reader.chunks()?.into_iter().find(|c| &c.tag == tags::MESH).unwrap();
        let mut r = reader.payload_reader(&chunk);
        assert_eq!(r.read_string()?, "Box");
        r.skip(36 + 2 + 2);
        assert_eq!(r.read_u32()?, 4);
        Ok(())
    }

    #[test]
    fn test_hemi_light_is_skipped() -> Result<()> {
        let mut scene = Scene::new();
        scene.lights.push(Light { name: "Sky".into(), kind: LightKind::Hemi, ..Default::default() });
        scene.lights.push(Light { name: "Key".into(), kind: LightKind::Point, ..Default::default() });
        scene.objects.push(Object::new("Sky", ObjectData::Light("Sky".into())));

        let bytes = export(&scene, ExportOptions::default())?;
        let reader = ChunkReader::new(&bytes)?;
        let chunks = reader.chunks()?;
        let lights: Vec<_> = chunks.iter().filter(|c| &c.tag == tags::LIGHT).collect();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].id, 3);
        assert_eq!(chunks.last().map(|c| c.id), Some(4));

        // The object's datablock list holds no light reference.
        let object = chunks.last().unwrap();
        let mut r = reader.payload_reader(object);
        assert_eq!(r.read_string()?, "Sky");
        r.skip(36 + 4 + 4 + 2 + 2);
        assert_eq!(r.read_u16()?, 0);
        Ok(())
    }
}
