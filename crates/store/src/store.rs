use std::fmt;
use std::path::Path;
use std::str::FromStr;

use regtune_rules::schema::{KeyPath, RegValue, StoreRoot};

use crate::error::StoreError;
use crate::file::FileStore;
use crate::memory::MemoryStore;

/// Access requested when opening an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// An open container in the store. Dropping the handle closes it.
pub trait StoreKey {
    /// Write (or overwrite) one named value.
    fn set_value(&mut self, name: &str, value: &RegValue) -> Result<(), StoreError>;

    /// Name of the direct child at `index`; `Ok(None)` once enumeration
    /// is exhausted.
    fn child_name(&self, index: usize) -> Result<Option<String>, StoreError>;
}

/// A tree-structured store addressed by root namespace plus path.
pub trait HierarchicalStore {
    /// Open an existing key. Never creates anything.
    fn open(
        &self,
        root: StoreRoot,
        path: &KeyPath,
        access: Access,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError>;

    /// Open a key for writing, creating it and any missing parents.
    fn create(&self, root: StoreRoot, path: &KeyPath)
        -> Result<Box<dyn StoreKey + '_>, StoreError>;

    /// Short backend label for logs and reports.
    fn name(&self) -> &'static str;

    /// Persist pending changes. No-op for backends that write through.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Which backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Registry,
    File,
    Memory,
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registry" => Ok(BackendKind::Registry),
            "file" => Ok(BackendKind::File),
            "memory" => Ok(BackendKind::Memory),
            other => Err(StoreError::Unsupported(format!(
                "unknown store backend '{}' (expected registry, file or memory)",
                other
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Registry => write!(f, "registry"),
            BackendKind::File => write!(f, "file"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Construct the selected backend. `file` is only used by [`BackendKind::File`].
pub fn open_backend(kind: BackendKind, file: &Path) -> Result<Box<dyn HierarchicalStore>, StoreError> {
    match kind {
        BackendKind::Memory => Ok(Box::new(MemoryStore::new())),
        BackendKind::File => Ok(Box::new(FileStore::open(file)?)),
        #[cfg(windows)]
        BackendKind::Registry => Ok(Box::new(crate::registry::RegistryStore::new())),
        #[cfg(not(windows))]
        BackendKind::Registry => Err(StoreError::Unsupported(
            "the registry backend is only available on Windows".to_string(),
        )),
    }
}
