//! Per-entity chunk payload writers.
//!
//! Each writer emits only the payload; framing and identifier registration
//! are done by the exporter and the hierarchy scheduler. Kinds that are not
//! representable report `None` before any chunk is opened, so a skipped
//! entity consumes no identifier.

pub mod animation;
pub mod audio;
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod modifier;
pub mod object;
pub mod physics;
pub mod rig;
pub mod scene;
pub mod vertex_group;
