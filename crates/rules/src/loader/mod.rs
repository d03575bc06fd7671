//! Filesystem catalog loader.
//!
//! Scans the catalog directory for YAML rule group files and loads them into
//! an in-memory set keyed by group id. A malformed file is reported and
//! skipped; it never aborts the scan.

mod core;
mod error;

#[cfg(test)]
mod tests;

pub use self::core::{parse_group, CatalogLoader};
pub use self::error::{CatalogError, LoadResult, LoadStatus, Result};
