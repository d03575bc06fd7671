//! Tests for the catalog loader module.

use std::fs;

use tempfile::TempDir;

use super::*;
use crate::schema::Stage;

const VALID_GROUP_YAML: &str = r#"
apiVersion: v1
kind: TweakGroup
metadata:
  id: test-group
  name: Test Group
stage: latency
steps:
  - registry:
      root: HKLM
      path: 'SYSTEM\CurrentControlSet\Control\Session Manager\kernel'
      name: DistributeTimers
      value: 1
      type: dword
"#;

fn temp_loader() -> (TempDir, CatalogLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let loader = CatalogLoader::new(dir.path().to_path_buf());
    (dir, loader)
}

fn loaded_ids(results: &[LoadResult]) -> Vec<&str> {
    results
        .iter()
        .filter_map(|r| match &r.status {
            LoadStatus::Loaded { group_id } => Some(group_id.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn load_group_from_file() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("test-group.yml");
    fs::write(&path, VALID_GROUP_YAML).unwrap();

    let group = loader.load_file(&path).unwrap();
    assert_eq!(group.id(), "test-group");
    assert_eq!(group.stage, Stage::Latency);
    assert_eq!(group.steps.len(), 1);
}

#[test]
fn load_all_skips_dotfiles_and_non_yaml() {
    let (dir, mut loader) = temp_loader();

    fs::write(dir.path().join("group1.yml"), VALID_GROUP_YAML).unwrap();
    fs::write(dir.path().join(".hidden.yml"), VALID_GROUP_YAML).unwrap();
    fs::write(dir.path().join("readme.txt"), "not a group").unwrap();

    let results = loader.load_all().unwrap();

    let skipped = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Skipped { .. }))
        .count();
    assert_eq!(loaded_ids(&results), vec!["test-group"]);
    assert_eq!(skipped, 2);
    assert!(loader.group("test-group").is_some());
}

#[test]
fn load_all_recursive_subdirectories() {
    let (dir, mut loader) = temp_loader();

    fs::write(dir.path().join("group1.yml"), VALID_GROUP_YAML).unwrap();
    let sub = dir.path().join("vendors");
    fs::create_dir(&sub).unwrap();
    fs::write(
        sub.join("sub-group.yaml"),
        VALID_GROUP_YAML.replace("test-group", "sub-group"),
    )
    .unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(loaded_ids(&results).len(), 2);
    assert!(loader.group("sub-group").is_some());
}

#[test]
fn malformed_file_does_not_abort_scan() {
    let (dir, mut loader) = temp_loader();

    fs::write(dir.path().join("a-broken.yml"), "apiVersion: v1\nkind: [").unwrap();
    let bad_entry = VALID_GROUP_YAML
        .replace("test-group", "bad-entry")
        .replace("value: 1", "value: \"one\"");
    fs::write(dir.path().join("b-bad-entry.yml"), bad_entry).unwrap();
    fs::write(dir.path().join("c-good.yml"), VALID_GROUP_YAML).unwrap();

    let results = loader.load_all().unwrap();

    let failed = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    assert_eq!(failed, 2);
    assert_eq!(loaded_ids(&results), vec!["test-group"]);
}

#[test]
fn duplicate_id_keeps_first_file() {
    let (dir, mut loader) = temp_loader();

    fs::write(dir.path().join("a.yml"), VALID_GROUP_YAML).unwrap();
    fs::write(
        dir.path().join("b.yml"),
        VALID_GROUP_YAML.replace("Test Group", "Shadow Group"),
    )
    .unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(loaded_ids(&results), vec!["test-group"]);

    let dup = results
        .iter()
        .find_map(|r| match &r.status {
            LoadStatus::Failed { error } => Some(error.clone()),
            _ => None,
        })
        .expect("duplicate should be reported");
    assert!(dup.contains("duplicate group id"), "{dup}");
    assert_eq!(loader.group("test-group").unwrap().name(), "Test Group");
}

#[test]
fn wrong_kind_rejected() {
    let yaml = VALID_GROUP_YAML.replace("kind: TweakGroup", "kind: AnomalyRule");
    let err = parse_group(&yaml).unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[test]
fn wrong_api_version_rejected() {
    let yaml = VALID_GROUP_YAML.replace("apiVersion: v1", "apiVersion: v9");
    assert!(matches!(
        parse_group(&yaml).unwrap_err(),
        CatalogError::Validation(_)
    ));
}

#[test]
fn missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut loader = CatalogLoader::new(dir.path().join("nope"));
    assert!(loader.load_all().is_err());
}

#[test]
fn groups_sorted_by_stage_order_and_id() {
    let (dir, mut loader) = temp_loader();

    let power = VALID_GROUP_YAML
        .replace("test-group", "power")
        .replace("stage: latency", "stage: power");
    let core_b = VALID_GROUP_YAML
        .replace("test-group", "core-b")
        .replace("stage: latency", "stage: core");
    let core_a_late = VALID_GROUP_YAML
        .replace("test-group", "core-a")
        .replace("stage: latency", "stage: core\norder: 5");

    fs::write(dir.path().join("1.yml"), power).unwrap();
    fs::write(dir.path().join("2.yml"), core_a_late).unwrap();
    fs::write(dir.path().join("3.yml"), core_b).unwrap();
    fs::write(dir.path().join("4.yml"), VALID_GROUP_YAML).unwrap();

    loader.load_all().unwrap();
    let ids: Vec<String> = loader.groups().iter().map(|g| g.id().to_string()).collect();
    assert_eq!(ids, vec!["core-b", "core-a", "test-group", "power"]);
}

#[test]
fn unreadable_entry_is_skipped() {
    let dir = std::path::Path::new("catalog");
    let entries = vec![
        Ok(dir.join("b.yml")),
        Err(std::io::Error::new(std::io::ErrorKind::Other, "stale handle")),
        Ok(dir.join("a.yml")),
    ];
    let paths = super::core::sorted_entry_paths(dir, entries.into_iter());
    assert_eq!(paths, vec![dir.join("a.yml"), dir.join("b.yml")]);
}
