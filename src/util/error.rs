//! Error types for the SCN writer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SCN export operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Chunk type tag is not exactly four ASCII bytes
    #[error("Invalid chunk tag: {0:?} (expected 4 ASCII bytes)")]
    InvalidTag(String),

    /// String cannot be stored as a length-prefixed ASCII string
    #[error("Invalid string {value:?}: {reason}")]
    InvalidString { value: String, reason: &'static str },

    /// Reference to an entity that was never registered
    #[error("No {category} registered under name {name:?}")]
    Unregistered { category: &'static str, name: String },

    /// Object names a parent that does not exist in the scene
    #[error("Object {object:?} has unknown parent {parent:?}")]
    MissingParent { object: String, parent: String },

    /// Parent chain loops back on itself
    #[error("Parent cycle detected at object {0:?}")]
    ParentCycle(String),

    /// Emission pass assigned a different identifier than the simulation predicted
    #[error("Scheduler divergence for {object:?}: predicted {predicted}, emitted {actual}")]
    SchedulerDivergence { object: String, predicted: u32, actual: u32 },

    /// Reading an external resource failed
    #[error("Failed to read resource {path}: {source}")]
    ResourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid data structure in a produced file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON scene snapshot could not be decoded
    #[error("Invalid scene snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}

/// Result type alias for SCN operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::InvalidTag("MSH".into());
        assert!(e.to_string().contains("MSH"));

        let e = Error::SchedulerDivergence { object: "Cube".into(), predicted: 7, actual: 8 };
        assert!(e.to_string().contains("7"));
        assert!(e.to_string().contains("8"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
