//! Texture and sound resource blocks.
//!
//! A resource is either embedded (base file name plus raw bytes) or
//! referenced by a path expressed under the configured [`PathRelativity`].
//!
//! ```text
//! str name_or_path, tag ext, u16 depth, u16 embedded,
//! [u32 len, bytes, pad byte if len is odd]
//! ```

use std::fs;
use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::options::{ExportOptions, PathRelativity};
use crate::chunk::{OStream, Tag};
use crate::scene::{Sound, Texture};
use crate::util::{Error, Result};

/// Name/extension pair written when a texture has no backing resource.
const NULL_NAME: &str = "null";
const NULL_EXT: Tag = *b"null";

/// Host prefix marking a path relative to the project file.
const PROJECT_PREFIX: &str = "//";

/// Resolved form of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceBlock {
    /// No underlying resource.
    Null,
    Referenced { path: String, ext: Tag, depth: u16 },
    Embedded { name: String, ext: Tag, depth: u16, bytes: Vec<u8> },
}

impl ResourceBlock {
    pub fn write<W: Write + Seek>(&self, out: &mut OStream<W>) -> Result<()> {
        match self {
            Self::Null => {
                out.write_string(NULL_NAME)?;
                out.write_tag(&NULL_EXT)?;
                out.write_u16(0)?;
                out.write_u16(0)
            }
            Self::Referenced { path, ext, depth } => {
                out.write_string(path)?;
                out.write_tag(ext)?;
                out.write_u16(*depth)?;
                out.write_flag(false)
            }
            Self::Embedded { name, ext, depth, bytes } => {
                out.write_string(name)?;
                out.write_tag(ext)?;
                out.write_u16(*depth)?;
                out.write_flag(true)?;
                let len = u32::try_from(bytes.len())
                    .map_err(|_| Error::other(format!("resource {name:?} exceeds 4 GiB")))?;
                out.write_u32(len)?;
                out.write_bytes(bytes)?;
                if len % 2 == 1 {
                    out.write_u8(0)?;
                }
                Ok(())
            }
        }
    }
}

/// Decides between embedding and referencing, and expresses paths.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    embed: bool,
    relativity: PathRelativity,
    project_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl ResourceResolver {
    /// `project_path` and `output_path` are file paths; their directories
    /// are the bases of the relative modes.
    pub fn new(options: &ExportOptions, project_path: Option<&Path>, output_path: Option<&Path>) -> Self {
        Self {
            embed: options.embed_resources,
            relativity: options.relativity,
            project_dir: project_path.map(parent_dir),
            output_dir: output_path.map(parent_dir),
        }
    }

    /// Absolute, normalized location of a host resource path.
    ///
    /// `//`-prefixed and plain relative paths resolve against the project
    /// directory, or the working directory when the project is unsaved.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        let raw = path.to_string_lossy();
        let joined = match raw.strip_prefix(PROJECT_PREFIX) {
            Some(rest) => self.project_base().join(rest),
            None if path.is_absolute() => path.to_path_buf(),
            None => self.project_base().join(path),
        };
        normalize(&absolutize(&joined))
    }

    fn project_base(&self) -> PathBuf {
        self.project_dir.clone().unwrap_or_else(|| absolutize(Path::new(".")))
    }

    /// Path string written for a referenced resource.
    pub fn reference_path(&self, absolute: &Path) -> String {
        let base = match self.relativity {
            PathRelativity::Absolute => None,
            PathRelativity::Project => self.project_dir.as_deref(),
            PathRelativity::Output => self.output_dir.as_deref(),
        };
        let path = match base {
            Some(base) => relative_path(absolute, base),
            None => absolute.to_path_buf(),
        };
        slash_path(&path)
    }

    /// Resolve a single resource.
    pub fn resolve(
        &self,
        filepath: &Path,
        format: &str,
        depth: u16,
        packed: Option<&[u8]>,
    ) -> Result<ResourceBlock> {
        let absolute = self.absolute(filepath);
        let ext = ext_tag(format, &absolute);

        if !self.embed {
            return Ok(ResourceBlock::Referenced { path: self.reference_path(&absolute), ext, depth });
        }

        let bytes = match packed {
            Some(bytes) => bytes.to_vec(),
            None => fs::read(&absolute)
                .map_err(|source| Error::ResourceRead { path: absolute.clone(), source })?,
        };
        debug!("Embedding {} ({} bytes)", absolute.display(), bytes.len());
        let name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ResourceBlock::Embedded { name, ext, depth, bytes })
    }

    /// Resource block of a texture's image.
    pub fn texture(&self, texture: &Texture) -> Result<ResourceBlock> {
        match &texture.image {
            Some(image) if !image.filepath.as_os_str().is_empty() || image.packed.is_some() => {
                let filepath = if image.filepath.as_os_str().is_empty() {
                    Path::new(&image.name)
                } else {
                    image.filepath.as_path()
                };
                self.resolve(filepath, &image.file_format, image.depth, image.packed.as_deref())
            }
            _ => Ok(ResourceBlock::Null),
        }
    }

    /// Resource block of a sound. The format is taken from the extension.
    pub fn sound(&self, sound: &Sound) -> Result<ResourceBlock> {
        if sound.filepath.as_os_str().is_empty() && sound.packed.is_none() {
            return Ok(ResourceBlock::Null);
        }
        let filepath = if sound.filepath.as_os_str().is_empty() {
            Path::new(&sound.name)
        } else {
            sound.filepath.as_path()
        };
        let format = filepath
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_uppercase())
            .unwrap_or_default();
        self.resolve(filepath, &format, 0, sound.packed.as_deref())
    }
}

/// Four-byte extension tag for a host format name.
///
/// `.dds` files are tagged `DDS ` regardless of the format name.
pub fn ext_tag(format: &str, path: &Path) -> Tag {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("dds")) {
        return *b"DDS ";
    }
    let code = match format {
        "TARGA" | "TARGA_RAW" => "TGA ",
        "JPEG" | "JPEG2000" => "JPEG",
        "THEORA" => "THEO",
        "FFMPEG" => "MPEG",
        "FRAMESERVER" => "FSVR",
        "OPEN_EXR" => "EXR ",
        "OPEN_EXR_MULTILAYER" => "EXRM",
        "CINEON" => "CINE",
        f if f.starts_with("AVI_") => "AVI ",
        f => f,
    };
    let mut tag = *b"    ";
    for (slot, b) in tag.iter_mut().zip(code.bytes().filter(u8::is_ascii)) {
        *slot = b;
    }
    tag
}

/// Lexical path of `path` relative to the directory `base`.
///
/// Paths on different roots are returned unchanged.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component<'_>> = path.components().collect();
    let from: Vec<Component<'_>> = base.components().collect();
    let common = target.iter().zip(&from).take_while(|(a, b)| a == b).count();
    if common == 0 && path.has_root() {
        return path.to_path_buf();
    }

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for c in &target[common..] {
        rel.push(c.as_os_str());
    }
    rel
}

fn parent_dir(file: &Path) -> PathBuf {
    let dir = file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    normalize(&absolutize(dir))
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Image;
    use std::io::Cursor;

    fn resolver(embed: bool, relativity: PathRelativity) -> ResourceResolver {
        let opts = ExportOptions::default().with_embed_resources(embed).with_relativity(relativity);
        ResourceResolver::new(
            &opts,
            Some(Path::new("/work/project/scene.blend")),
            Some(Path::new("/work/out/level.scn")),
        )
    }

    fn bytes_of(block: &ResourceBlock) -> Vec<u8> {
        let mut out = OStream::new(Cursor::new(Vec::new()));
        block.write(&mut out).unwrap();
        out.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_ext_tags() {
        let p = Path::new("a.png");
        assert_eq!(&ext_tag("TARGA_RAW", p), b"TGA ");
        assert_eq!(&ext_tag("JPEG2000", p), b"JPEG");
        assert_eq!(&ext_tag("AVI_JPEG", p), b"AVI ");
        assert_eq!(&ext_tag("OPEN_EXR_MULTILAYER", p), b"EXRM");
        assert_eq!(&ext_tag("PNG", p), b"PNG ");
        assert_eq!(&ext_tag("IRIS_RGB", p), b"IRIS");
        assert_eq!(&ext_tag("", p), b"    ");
        assert_eq!(&ext_tag("PNG", Path::new("tex/Normal.DdS")), b"DDS ");
    }

    #[test]
    fn test_relative_path() {
        let abs = Path::new("/work/project/textures/wood.png");
        assert_eq!(relative_path(abs, Path::new("/work/project")), PathBuf::from("textures/wood.png"));
        assert_eq!(
            relative_path(abs, Path::new("/work/out")),
            PathBuf::from("../project/textures/wood.png")
        );
        assert_eq!(relative_path(abs, Path::new("/")), PathBuf::from("work/project/textures/wood.png"));
    }

    #[test]
    fn test_absolute_resolves_project_prefix() {
        let r = resolver(false, PathRelativity::Absolute);
        assert_eq!(
            r.absolute(Path::new("//textures/../tex/wood.png")),
            PathBuf::from("/work/project/tex/wood.png")
        );
        assert_eq!(r.absolute(Path::new("tex/wood.png")), PathBuf::from("/work/project/tex/wood.png"));
        assert_eq!(r.absolute(Path::new("/abs/wood.png")), PathBuf::from("/abs/wood.png"));
    }

    #[test]
    fn test_reference_modes() -> Result<()> {
        let path = Path::new("//tex/wood.png");
        let abs = resolver(false, PathRelativity::Absolute).resolve(path, "PNG", 24, None)?;
        let proj = resolver(false, PathRelativity::Project).resolve(path, "PNG", 24, None)?;
        let out = resolver(false, PathRelativity::Output).resolve(path, "PNG", 24, None)?;

        let path_of = |b: &ResourceBlock| match b {
            ResourceBlock::Referenced { path, .. } => path.clone(),
            other => panic!("expected reference, got {other:?}"),
        };
        assert_eq!(path_of(&abs), "/work/project/tex/wood.png");
        assert_eq!(path_of(&proj), "tex/wood.png");
        assert_eq!(path_of(&out), "../project/tex/wood.png");
        Ok(())
    }

    #[test]
    fn test_null_block_bytes() {
        let bytes = bytes_of(&ResourceBlock::Null);
        assert_eq!(bytes, b"\x04null\0null\0\0\0\0");
    }

    #[test]
    fn test_embed_packed_odd_length_is_padded() -> Result<()> {
        let r = resolver(true, PathRelativity::Output);
        let block = r.resolve(Path::new("//t.png"), "PNG", 32, Some(&[1, 2, 3]))?;
        let bytes = bytes_of(&block);
        // "t.png" (odd) has no pad; 3-byte payload gets one
        let mut expected = vec![5];
        expected.extend_from_slice(b"t.png");
        expected.extend_from_slice(b"PNG ");
        expected.extend_from_slice(&32u16.to_le_bytes());
        expected.extend_from_slice(&1u16.to_le_bytes());
        expected.extend_from_slice(&3u32.to_le_bytes());
        expected.extend_from_slice(&[1, 2, 3, 0]);
        assert_eq!(bytes, expected);
        Ok(())
    }

    #[test]
    fn test_embed_reads_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".dds").tempfile()?;
        file.write_all(&[9u8; 8])?;
        let r = resolver(true, PathRelativity::Absolute);
        match r.resolve(file.path(), "PNG", 0, None)? {
            ResourceBlock::Embedded { ext, bytes, .. } => {
                assert_eq!(&ext, b"DDS ");
                assert_eq!(bytes, vec![9u8; 8]);
            }
            other => panic!("expected embedded block, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_embed_missing_file_fails() {
        let r = resolver(true, PathRelativity::Absolute);
        let err = r.resolve(Path::new("/definitely/not/here.png"), "PNG", 0, None).unwrap_err();
        assert!(matches!(err, Error::ResourceRead { .. }));
    }

    #[test]
    fn test_texture_without_image_is_null() -> Result<()> {
        let r = resolver(true, PathRelativity::Output);
        assert_eq!(r.texture(&Texture { name: "Clouds".into(), image: None })?, ResourceBlock::Null);
        let empty = Texture { name: "T".into(), image: Some(Image::default()) };
        assert_eq!(r.texture(&empty)?, ResourceBlock::Null);
        Ok(())
    }

    #[test]
    fn test_sound_format_from_extension() -> Result<()> {
        let r = resolver(false, PathRelativity::Project);
        let sound = Sound { name: "Boom".into(), filepath: "//sfx/boom.wav".into(), packed: None };
        match r.sound(&sound)? {
            ResourceBlock::Referenced { path, ext, depth } => {
                assert_eq!(path, "sfx/boom.wav");
                assert_eq!(&ext, b"WAV ");
                assert_eq!(depth, 0);
            }
            other => panic!("expected reference, got {other:?}"),
        }
        Ok(())
    }
}
