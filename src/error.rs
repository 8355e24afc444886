//! Error types for the ROM reconstruction tool.
//!
//! The analysis core never fails: uncertainty is carried as scores, opaque
//! bytes and halt reasons. Errors only arise at the edges, when reading an
//! image from disk, writing the generated project, or validating options.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for the crate.
#[derive(Debug, Error)]
pub enum ReconError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a specific output file or directory failed.
    #[error("Failed to write {}: {source}", path.display())]
    OutputPath {
        /// File or directory being written
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What was wrong with the options
        message: String,
    },
}

/// Result type alias for fallible operations.
pub type Result<T> = std::result::Result<T, ReconError>;

/// Extension trait for attaching an output path to IO errors.
pub trait ResultExt<T> {
    /// Tag an IO failure with the path being written.
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| ReconError::OutputPath {
            path: path.into(),
            source,
        })
    }
}
