//! Integration tests that load the shipped catalog in `data/catalog/`
//! and check it against the loader, validation and catalog assembly.

use regtune_core::{GpuVendor, HardwareProfile, StorageMedium};
use regtune_rules::catalog::RuleCatalogBuilder;
use regtune_rules::loader::{CatalogLoader, LoadStatus};
use regtune_rules::schema::{CommandLine, RegValue, Stage, StoreRoot, TweakStep};
use regtune_rules::validation::validate_catalog;

/// Integration tests run from the crate directory, so we go up two levels.
fn catalog_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/catalog")
}

fn load() -> CatalogLoader {
    let mut loader = CatalogLoader::new(catalog_dir());
    let results = loader.load_all().expect("catalog dir exists");
    for result in &results {
        if let LoadStatus::Failed { error } = &result.status {
            panic!("failed to load {}: {}", result.path.display(), error);
        }
    }
    loader
}

#[test]
fn shipped_catalog_loads_and_validates() {
    let loader = load();
    let groups = loader.groups();
    assert!(groups.len() >= 14);

    let result = validate_catalog(&groups);
    assert!(result.valid, "{:#?}", result.errors);
    assert!(result.warnings.is_empty(), "{:#?}", result.warnings);
}

#[test]
fn every_stage_is_covered() {
    let loader = load();
    let groups = loader.groups();
    for stage in Stage::ALL {
        assert!(
            groups.iter().any(|g| g.stage == stage),
            "no group for stage {stage}"
        );
    }
}

#[test]
fn core_group_normalizes_both_value_shapes() {
    let loader = load();
    let core = loader.group("core-system").expect("core-system group");

    let first = core.entries().next().unwrap();
    assert_eq!(first.root(), StoreRoot::LocalMachine);
    assert_eq!(first.values()["Win32PrioritySeparation"], RegValue::Integer32(40));

    let desktop = core
        .entries()
        .find(|e| e.root() == StoreRoot::CurrentUser && e.values().len() > 1)
        .expect("multi-value desktop entry");
    let names: Vec<&str> = desktop.values().keys().map(String::as_str).collect();
    assert_eq!(names[0], "AutoEndTasks");
    assert_eq!(desktop.values()["MenuShowDelay"], RegValue::from("0"));
}

#[test]
fn network_group_has_recursive_interfaces_entry() {
    let loader = load();
    let network = loader.group("network").unwrap();

    let recursive: Vec<_> = network.entries().filter(|e| e.is_recursive()).collect();
    assert_eq!(recursive.len(), 1);
    assert_eq!(recursive[0].path().segments().last().unwrap(), "Interfaces");
    assert_eq!(network.commands().count(), 2);
}

#[test]
fn interrupt_group_uses_argument_vector() {
    let loader = load();
    let group = loader.group("interrupt").unwrap();
    let TweakStep::Command(cmd) = &group.steps[0] else {
        panic!("expected a command step");
    };
    match &cmd.line {
        CommandLine::Args(argv) => {
            assert_eq!(argv[0], "powershell");
            assert_eq!(argv.len(), 3);
        }
        other => panic!("expected argv form, got {other:?}"),
    }
}

#[test]
fn nvidia_ssd_profile_selects_vendor_and_medium_groups() {
    let loader = load();
    let builder = RuleCatalogBuilder::new(loader.groups());
    let profile = HardwareProfile::new(GpuVendor::Nvidia, StorageMedium::Ssd, 32);
    let catalog = builder.build(&profile);

    assert!(catalog.contains("gpu-nvidia"));
    assert!(catalog.contains("storage-ssd"));
    assert!(catalog.contains("memory-compression-off"));
    for id in ["gpu-amd", "gpu-intel", "storage-hdd", "memory-compression-on"] {
        assert!(!catalog.contains(id), "{id} should be excluded");
    }

    let stages: Vec<Stage> = catalog.groups.iter().map(|g| g.stage).collect();
    let mut sorted = stages.clone();
    sorted.sort();
    assert_eq!(stages, sorted);
}

#[test]
fn unknown_profile_selects_only_unconditional_groups() {
    let loader = load();
    let catalog = RuleCatalogBuilder::new(loader.groups()).build(&HardwareProfile::default());

    assert!(catalog.groups.iter().all(|g| g.stage != Stage::Gpu));
    assert!(!catalog.contains("storage-ssd"));
    assert!(!catalog.contains("storage-hdd"));
    // ram_gib 0 still satisfies `lte: 16`
    assert!(catalog.contains("memory-compression-on"));
}
