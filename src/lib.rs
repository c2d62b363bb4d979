//! # SCN
//!
//! Writer for SCN, a chunk-based binary container for 3D scenes.
//!
//! A file is a RIFF-style root (`RIFF`, length, `SCNE`) followed by a flat
//! run of chunks. Every chunk carries a type tag, a format version and a
//! run-unique identifier; chunks reference each other by identifier.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math types
//! - [`chunk`] - Container framing, primitive stream and a verifying reader
//! - [`scene`] - Host scene snapshot handed to the exporter
//! - [`export`] - Export engine: registry, scheduler and entity encoders
//!
//! ## Example
//!
//! ```ignore
//! use scn::export::Exporter;
//! use scn::scene::Scene;
//!
//! let scene = Scene::from_json_reader(std::fs::File::open("level.json")?)?;
//! let stats = Exporter::new(&scene).export_to_path("level.scn")?;
//! println!("{} chunks, {} bytes", stats.chunks, stats.bytes);
//! ```

pub mod util;
pub mod chunk;
pub mod scene;
pub mod export;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::chunk::{ChunkReader, ChunkWriter, OStream, Tag};
    pub use crate::export::{ExportOptions, ExportStats, Exporter, ModifierMode, PathRelativity};
    pub use crate::scene::{MeshEvaluator, Object, ObjectData, Scene};
    pub use crate::util::{Error, Result};
}
