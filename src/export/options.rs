//! Per-run export configuration.

use serde::{Deserialize, Serialize};

/// How referenced resource paths are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRelativity {
    /// Absolute filesystem path.
    Absolute,
    /// Relative to the directory of the host project file.
    Project,
    /// Relative to the directory of the output file.
    #[default]
    Output,
}

/// What happens to object modifier stacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierMode {
    /// Write each modifier as its own `MDFR` chunk.
    #[default]
    Preserve,
    /// Bake modifiers into single-user meshes before geometry extraction.
    Apply,
    /// Drop modifiers entirely.
    Ignore,
}

/// Immutable options for one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Embed texture and sound bytes instead of referencing files.
    pub embed_resources: bool,
    pub relativity: PathRelativity,
    pub modifier_mode: ModifierMode,
    /// Recorded in the run metadata when set.
    pub author: Option<String>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embed_resources(mut self, embed: bool) -> Self {
        self.embed_resources = embed;
        self
    }

    pub fn with_relativity(mut self, relativity: PathRelativity) -> Self {
        self.relativity = relativity;
        self
    }

    pub fn with_modifier_mode(mut self, mode: ModifierMode) -> Self {
        self.modifier_mode = mode;
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Modifiers are written as chunks.
    #[inline]
    pub fn preserves_modifiers(&self) -> bool {
        self.modifier_mode == ModifierMode::Preserve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ExportOptions::default();
        assert!(!opts.embed_resources);
        assert_eq!(opts.relativity, PathRelativity::Output);
        assert_eq!(opts.modifier_mode, ModifierMode::Preserve);
        assert!(opts.preserves_modifiers());
    }

    #[test]
    fn test_from_json() {
        let opts: ExportOptions =
            serde_json::from_str(r#"{ "embed_resources": true, "modifier_mode": "apply" }"#)
                .unwrap();
        assert!(opts.embed_resources);
        assert_eq!(opts.modifier_mode, ModifierMode::Apply);
        assert_eq!(opts.relativity, PathRelativity::Output);
    }
}
