use indexmap::IndexMap;

use regtune_rules::schema::{KeyPath, RegValue, StoreRoot};
use regtune_store::MemoryStore;

use super::*;

const HKLM: StoreRoot = StoreRoot::LocalMachine;

fn path(s: &str) -> KeyPath {
    s.parse().unwrap()
}

fn entry(p: &str, values: &[(&str, u32)], recursive: bool) -> RuleEntry {
    let values: IndexMap<String, RegValue> = values
        .iter()
        .map(|(k, v)| (k.to_string(), RegValue::Integer32(*v)))
        .collect();
    RuleEntry::new(HKLM, path(p), values, recursive, "test entry").unwrap()
}

/// Wraps a [`MemoryStore`] and injects failures by value name or
/// enumeration index.
struct FlakyStore {
    inner: MemoryStore,
    fail_value: Option<&'static str>,
    fail_enum_at: Option<usize>,
}

struct FlakyKey<'a> {
    inner: Box<dyn StoreKey + 'a>,
    fail_value: Option<&'static str>,
    fail_enum_at: Option<usize>,
}

impl HierarchicalStore for FlakyStore {
    fn open(
        &self,
        root: StoreRoot,
        path: &KeyPath,
        access: Access,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        Ok(Box::new(FlakyKey {
            inner: self.inner.open(root, path, access)?,
            fail_value: self.fail_value,
            fail_enum_at: self.fail_enum_at,
        }))
    }

    fn create(
        &self,
        root: StoreRoot,
        path: &KeyPath,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        Ok(Box::new(FlakyKey {
            inner: self.inner.create(root, path)?,
            fail_value: self.fail_value,
            fail_enum_at: self.fail_enum_at,
        }))
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

impl StoreKey for FlakyKey<'_> {
    fn set_value(&mut self, name: &str, value: &RegValue) -> Result<(), StoreError> {
        if self.fail_value == Some(name) {
            return Err(StoreError::AccessDenied(name.to_string()));
        }
        self.inner.set_value(name, value)
    }

    fn child_name(&self, index: usize) -> Result<Option<String>, StoreError> {
        if self.fail_enum_at == Some(index) {
            return Err(StoreError::Io(std::io::Error::other("enumeration broke")));
        }
        self.inner.child_name(index)
    }
}

#[test]
fn direct_write_creates_key_and_values() {
    let store = MemoryStore::new();
    let engine = StoreApplyEngine::new(&store);
    let e = entry(r"SYSTEM\Tcpip\Parameters", &[("TcpAckFrequency", 1), ("TCPNoDelay", 1)], false);

    let result = engine.apply(&e);

    assert!(result.is_success(), "{:?}", result.reason());
    assert_eq!(result.target, r"HKLM\SYSTEM\Tcpip\Parameters");
    let values = store.values(HKLM, e.path()).unwrap();
    let names: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(names, ["TcpAckFrequency", "TCPNoDelay"]);
}

#[test]
fn reapplying_is_idempotent() {
    let store = MemoryStore::new();
    let engine = StoreApplyEngine::new(&store);
    let e = entry(r"SOFTWARE\Regtune", &[("A", 1), ("B", 2)], false);

    assert!(engine.apply(&e).is_success());
    let once = store.snapshot();
    assert!(engine.apply(&e).is_success());
    assert_eq!(store.snapshot(), once);
}

#[test]
fn existing_values_are_overwritten() {
    let store = MemoryStore::new();
    let engine = StoreApplyEngine::new(&store);
    engine.apply(&entry("K", &[("A", 1)], false));
    engine.apply(&entry("K", &[("A", 7)], false));
    assert_eq!(store.value(HKLM, &path("K"), "A"), Some(RegValue::Integer32(7)));
}

#[test]
fn protected_key_is_store_open_failed() {
    let store = MemoryStore::new();
    store.insert_key(HKLM, &path("Locked"));
    store.protect(HKLM, &path("Locked")).unwrap();

    let result = StoreApplyEngine::new(&store).apply(&entry("Locked", &[("A", 1)], false));

    assert!(!result.is_success());
    assert_eq!(result.failure_kind, Some(FailureKind::StoreOpenFailed));
    assert!(result.reason().unwrap().contains("Locked"));
}

#[test]
fn write_failure_keeps_earlier_values() {
    let store = FlakyStore {
        inner: MemoryStore::new(),
        fail_value: Some("B"),
        fail_enum_at: None,
    };
    let result =
        StoreApplyEngine::new(&store).apply(&entry("K", &[("A", 1), ("B", 2), ("C", 3)], false));

    assert_eq!(result.failure_kind, Some(FailureKind::StoreWriteFailed));
    assert!(result.reason().unwrap().contains("'B'"));
    let values = store.inner.values(HKLM, &path("K")).unwrap();
    assert_eq!(values.get("A"), Some(&RegValue::Integer32(1)));
    assert!(values.get("C").is_none());
}

#[test]
fn recursive_with_no_children_succeeds() {
    let store = MemoryStore::new();
    store.insert_key(HKLM, &path("Interfaces"));

    let result = StoreApplyEngine::new(&store).apply(&entry("Interfaces", &[("A", 1)], true));

    assert!(result.is_success());
    let children = result.children.unwrap();
    assert_eq!(children.written, 0);
    assert_eq!(children.skipped, 0);
    // the parent itself is never written
    assert!(store.values(HKLM, &path("Interfaces")).unwrap().is_empty());
}

#[test]
fn recursive_skips_child_that_cannot_be_opened() {
    let store = MemoryStore::new();
    for name in ["{a}", "{b}", "{c}"] {
        store.insert_key(HKLM, &path("Interfaces").child(name));
    }
    store.protect(HKLM, &path(r"Interfaces\{b}")).unwrap();

    let e = entry("Interfaces", &[("TcpAckFrequency", 1), ("TCPNoDelay", 1)], true);
    let result = StoreApplyEngine::new(&store).apply(&e);

    assert!(result.is_success());
    let children = result.children.clone().unwrap();
    assert_eq!(children.written, 2);
    assert_eq!(children.skipped, 1);
    assert_eq!(children.failures[0].child, "{b}");

    for written in ["{a}", "{c}"] {
        let values = store.values(HKLM, &path("Interfaces").child(written)).unwrap();
        assert_eq!(values.len(), 2, "{written}");
    }
    assert!(store
        .values(HKLM, &path(r"Interfaces\{b}"))
        .unwrap()
        .is_empty());
}

#[test]
fn recursive_missing_parent_fails_without_creating_it() {
    let store = MemoryStore::new();
    let result = StoreApplyEngine::new(&store).apply(&entry(r"Missing\Parent", &[("A", 1)], true));

    assert_eq!(result.failure_kind, Some(FailureKind::StoreOpenFailed));
    assert!(result.children.is_none());
    assert!(!store.contains(HKLM, &path(r"Missing\Parent")));
}

#[test]
fn enumeration_error_stops_walk_but_entry_succeeds() {
    let inner = MemoryStore::new();
    for name in ["one", "two", "three"] {
        inner.insert_key(HKLM, &path("P").child(name));
    }
    let store = FlakyStore {
        inner,
        fail_value: None,
        fail_enum_at: Some(1),
    };

    let result = StoreApplyEngine::new(&store).apply(&entry("P", &[("A", 1)], true));

    assert!(result.is_success());
    let children = result.children.unwrap();
    assert_eq!(children.written, 1);
    assert!(children.enumeration_error.unwrap().contains("enumeration broke"));
}
