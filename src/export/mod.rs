//! SCN export engine.
//!
//! - [`options`] - per-run configuration
//! - [`context`] - identifier registry and run state
//! - [`resource`] - embedded and referenced resource blocks
//! - [`cursor`] - counting/writing chunk cursor
//! - [`scheduler`] - two-pass object hierarchy emission
//! - [`schema`] - per-entity payload writers
//! - [`exporter`] - the category-ordered orchestrator

pub mod context;
pub mod cursor;
pub mod exporter;
pub mod options;
pub mod resource;
pub mod scheduler;
pub mod schema;

pub use context::{Category, ExportContext, Registry};
pub use exporter::{ExportStats, Exporter};
pub use options::{ExportOptions, ModifierMode, PathRelativity};
pub use resource::{ResourceBlock, ResourceResolver};
