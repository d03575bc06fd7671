//! JSON-file persisted store.
//!
//! The whole tree is loaded at open and written back by [`FileStore::save`]
//! (also reached through [`HierarchicalStore::flush`]). Saves go to a
//! sibling temp file first and are renamed over the target.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use regtune_rules::schema::{KeyPath, StoreRoot};

use crate::error::StoreError;
use crate::memory::{MemoryStore, Snapshot};
use crate::store::{Access, HierarchicalStore, StoreKey};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Load `path` if it exists, otherwise start empty.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let inner = if path.exists() {
            let contents = fs::read_to_string(path)?;
            let snapshot: Snapshot = if contents.trim().is_empty() {
                Snapshot::new()
            } else {
                serde_json::from_str(&contents)?
            };
            info!(path = %path.display(), roots = snapshot.len(), "loaded store file");
            MemoryStore::from_snapshot(snapshot)
        } else {
            debug!(path = %path.display(), "store file absent, starting empty");
            MemoryStore::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory tree, for inspection.
    pub fn tree(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.inner.snapshot())?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), "store file saved");
        Ok(())
    }
}

impl HierarchicalStore for FileStore {
    fn open(
        &self,
        root: StoreRoot,
        path: &KeyPath,
        access: Access,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        self.inner.open(root, path, access)
    }

    fn create(
        &self,
        root: StoreRoot,
        path: &KeyPath,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        self.inner.create(root, path)
    }

    fn name(&self) -> &'static str {
        "file"
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use regtune_rules::schema::RegValue;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(&dir.path().join("store.json")).unwrap();
        assert!(store.tree().snapshot().is_empty());
    }

    #[test]
    fn save_and_reload_preserves_tree() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nested").join("store.json");
        let path: KeyPath = r"Control Panel\Desktop".parse().unwrap();

        {
            let store = FileStore::open(&file).unwrap();
            let mut key = store.create(StoreRoot::CurrentUser, &path).unwrap();
            key.set_value("MenuShowDelay", &RegValue::from("0")).unwrap();
            key.set_value("Count", &RegValue::Integer32(7)).unwrap();
            drop(key);
            store.flush().unwrap();
        }

        assert!(file.exists());
        assert!(!dir.path().join("nested").join("store.json.tmp").exists());

        let reloaded = FileStore::open(&file).unwrap();
        let values = reloaded.tree().values(StoreRoot::CurrentUser, &path).unwrap();
        assert_eq!(values["MenuShowDelay"], RegValue::from("0"));
        assert_eq!(values["Count"], RegValue::Integer32(7));
        let names: Vec<&String> = values.keys().collect();
        assert_eq!(names, ["MenuShowDelay", "Count"]);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("store.json");
        fs::write(&file, "{ not json").unwrap();
        assert!(matches!(FileStore::open(&file), Err(StoreError::Json(_))));
    }
}
