//! In-process store: a tree of nodes with ordered values.
//!
//! Names are matched case-insensitively and keep the spelling they were
//! first created with, like the registry does.

use std::cell::RefCell;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use regtune_rules::schema::{KeyPath, RegValue, StoreRoot};

use crate::error::StoreError;
use crate::store::{Access, HierarchicalStore, StoreKey};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, RegValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, Node>,
    /// Refuses write access; models an ACL the caller cannot pass.
    #[serde(skip)]
    protected: bool,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    fn child_or_insert(&mut self, name: &str) -> &mut Node {
        let existing = self
            .children
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned();
        let key = existing.unwrap_or_else(|| name.to_string());
        self.children.entry(key).or_default()
    }

    fn set(&mut self, name: &str, value: RegValue) {
        match self.values.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, slot)) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn value(&self, name: &str) -> Option<&RegValue> {
        self.values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// Whole-store contents, one tree per root.
pub type Snapshot = BTreeMap<StoreRoot, Node>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    roots: RefCell<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            roots: RefCell::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.roots.borrow().clone()
    }

    /// Create a key (and its parents) without opening a handle.
    pub fn insert_key(&self, root: StoreRoot, path: &KeyPath) {
        let mut roots = self.roots.borrow_mut();
        let mut node = roots.entry(root).or_default();
        for segment in path.segments() {
            node = node.child_or_insert(segment);
        }
    }

    /// Mark an existing key as refusing write access.
    pub fn protect(&self, root: StoreRoot, path: &KeyPath) -> Result<(), StoreError> {
        self.with_node_mut(root, path, |node| {
            node.protected = true;
            Ok(())
        })
    }

    pub fn value(&self, root: StoreRoot, path: &KeyPath, name: &str) -> Option<RegValue> {
        let roots = self.roots.borrow();
        find(&roots, root, path)?.value(name).cloned()
    }

    pub fn values(&self, root: StoreRoot, path: &KeyPath) -> Option<IndexMap<String, RegValue>> {
        let roots = self.roots.borrow();
        find(&roots, root, path).map(|node| node.values.clone())
    }

    pub fn children(&self, root: StoreRoot, path: &KeyPath) -> Vec<String> {
        let roots = self.roots.borrow();
        find(&roots, root, path)
            .map(|node| node.children.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, root: StoreRoot, path: &KeyPath) -> bool {
        find(&self.roots.borrow(), root, path).is_some()
    }

    fn with_node_mut<T>(
        &self,
        root: StoreRoot,
        path: &KeyPath,
        f: impl FnOnce(&mut Node) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut roots = self.roots.borrow_mut();
        let mut node = roots
            .get_mut(&root)
            .ok_or_else(|| not_found(root, path))?;
        for segment in path.segments() {
            node = node
                .child_mut(segment)
                .ok_or_else(|| not_found(root, path))?;
        }
        f(node)
    }
}

fn find<'a>(roots: &'a Snapshot, root: StoreRoot, path: &KeyPath) -> Option<&'a Node> {
    let mut node = roots.get(&root)?;
    for segment in path.segments() {
        node = node.child(segment)?;
    }
    Some(node)
}

fn not_found(root: StoreRoot, path: &KeyPath) -> StoreError {
    StoreError::NotFound(format!("{root}\\{path}"))
}

fn denied(root: StoreRoot, path: &KeyPath) -> StoreError {
    StoreError::AccessDenied(format!("{root}\\{path}"))
}

impl HierarchicalStore for MemoryStore {
    fn open(
        &self,
        root: StoreRoot,
        path: &KeyPath,
        access: Access,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        let roots = self.roots.borrow();
        let node = find(&roots, root, path).ok_or_else(|| not_found(root, path))?;
        if access == Access::Write && node.protected {
            return Err(denied(root, path));
        }
        Ok(Box::new(MemoryKey {
            store: self,
            root,
            path: path.clone(),
            access,
        }))
    }

    fn create(
        &self,
        root: StoreRoot,
        path: &KeyPath,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        if let Some(node) = find(&self.roots.borrow(), root, path) {
            if node.protected {
                return Err(denied(root, path));
            }
        }
        self.insert_key(root, path);
        Ok(Box::new(MemoryKey {
            store: self,
            root,
            path: path.clone(),
            access: Access::Write,
        }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Handle into a [`MemoryStore`]; re-resolves its path on every call so
/// no borrow is held between operations.
struct MemoryKey<'a> {
    store: &'a MemoryStore,
    root: StoreRoot,
    path: KeyPath,
    access: Access,
}

impl StoreKey for MemoryKey<'_> {
    fn set_value(&mut self, name: &str, value: &RegValue) -> Result<(), StoreError> {
        if self.access != Access::Write {
            return Err(StoreError::AccessDenied(format!(
                "{}\\{} was opened read-only",
                self.root, self.path
            )));
        }
        self.store.with_node_mut(self.root, &self.path, |node| {
            node.set(name, value.clone());
            Ok(())
        })
    }

    fn child_name(&self, index: usize) -> Result<Option<String>, StoreError> {
        let roots = self.store.roots.borrow();
        let node = find(&roots, self.root, &self.path).ok_or_else(|| not_found(self.root, &self.path))?;
        Ok(node.children.keys().nth(index).cloned())
    }
}
