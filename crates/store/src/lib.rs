//! Hierarchical key-value store boundary.
//!
//! The engine only talks to [`HierarchicalStore`] and the [`StoreKey`]
//! handles it hands out. Backends:
//! - [`MemoryStore`]: in-process tree, used for tests and dry runs
//! - [`FileStore`]: a memory tree persisted as JSON
//! - `RegistryStore`: the Windows registry (Windows builds only)

pub mod error;
pub mod file;
pub mod memory;
#[cfg(windows)]
pub mod registry;
mod store;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(windows)]
pub use registry::RegistryStore;
pub use store::{open_backend, Access, BackendKind, HierarchicalStore, StoreKey};
