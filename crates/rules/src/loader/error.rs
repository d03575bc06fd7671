//! Error types and load result structures for the catalog loader.

use std::path::PathBuf;

/// Errors that can occur while loading catalog files.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error (includes entry normalization errors).
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Document-level validation error (wrong kind, duplicate id, ...).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Outcome of loading a single catalog file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Group was successfully loaded.
    Loaded { group_id: String },
    /// File was skipped (dotfile, non-YAML, etc.).
    Skipped { reason: String },
    /// Parse or validation error occurred.
    Failed { error: String },
}
