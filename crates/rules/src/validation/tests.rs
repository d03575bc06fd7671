use regtune_core::{GpuVendor, StorageMedium};

use super::*;
use crate::schema::{Predicate, RamCondition, RuleEntry, RuleGroup, Stage, StoreRoot};

fn entry(name: &str, value: u32) -> RuleEntry {
    RuleEntry::single(
        StoreRoot::LocalMachine,
        r"SOFTWARE\Regtune\Test",
        name,
        value,
        "test write",
    )
    .unwrap()
}

fn group(id: &str, stage: Stage) -> RuleGroup {
    RuleGroup::new(id, "Test", stage).with_step(entry("Value", 1))
}

#[test]
fn well_formed_group_is_valid() {
    let result = validate_group(&group("core-system", Stage::Core));
    assert!(result.valid, "{:?}", result.errors);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn non_kebab_id_is_an_error() {
    let result = validate_group(&group("Core_System", Stage::Core));
    assert!(!result.valid);
    assert!(result.errors[0].path.ends_with("metadata.id"));
}

#[test]
fn empty_steps_is_an_error() {
    let result = validate_group(&RuleGroup::new("empty", "Empty", Stage::Core));
    assert!(!result.valid);
    assert!(result.errors[0].message.contains("at least one step"));
}

#[test]
fn unknown_vendor_predicate_is_an_error() {
    let g = group("gpu-mystery", Stage::Gpu).with_predicate(Predicate::gpu(GpuVendor::Unknown));
    let result = validate_group(&g);
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.path.ends_with("when.gpu_vendor")));
}

#[test]
fn unknown_medium_predicate_is_an_error() {
    let g = group("storage-mystery", Stage::Storage)
        .with_predicate(Predicate::storage(StorageMedium::Unknown));
    assert!(!validate_group(&g).valid);
}

#[test]
fn contradictory_ram_bounds_is_an_error() {
    let g = group("finalize", Stage::Finalization).with_predicate(Predicate::ram(RamCondition {
        gt: Some(16),
        lte: Some(8),
        ..Default::default()
    }));
    let result = validate_group(&g);
    assert!(!result.valid);
    assert!(result.errors[0].path.ends_with("when.ram_gib"));
}

#[test]
fn unconditional_gpu_group_warns() {
    let result = validate_group(&group("gpu-generic", Stage::Gpu));
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn conflicting_writes_in_one_group_warn() {
    let g = group("core-system", Stage::Core).with_step(entry("Value", 2));
    let result = validate_group(&g);
    assert!(result.valid);
    assert!(result.warnings[0].message.contains("written twice"));
}

#[test]
fn duplicate_ids_across_catalog() {
    let groups = vec![group("core-system", Stage::Core), group("core-system", Stage::Latency)];
    let result = validate_catalog(&groups);
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.message.contains("duplicate group id")));
}

#[test]
fn validate_yaml_reports_parse_errors() {
    let result = validate_yaml("apiVersion: v1\nkind: TweakGroup\nmetadata: [");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn validate_yaml_accepts_well_formed_document() {
    let yaml = r#"
apiVersion: v1
kind: TweakGroup
metadata:
  id: power-plan
  name: Power plan
stage: power
steps:
  - command:
      shell: powercfg -setactive SCHEME_MIN
      description: Activate high performance plan
"#;
    let result = validate_yaml(yaml);
    assert!(result.valid, "{:?}", result.errors);
}

#[test]
fn empty_when_block_warns_and_is_unconditional() {
    let yaml = r#"
apiVersion: v1
kind: TweakGroup
metadata:
  id: frame-pacing
  name: Frame pacing
stage: frame_rate
when: {}
steps:
  - registry:
      root: HKLM
      path: 'SYSTEM\CurrentControlSet\Control\PriorityControl'
      name: Win32PrioritySeparation
      value: 38
      type: dword
      description: Favor foreground quanta
"#;
    let group = crate::loader::parse_group(yaml).unwrap();
    assert!(group.when.is_some());
    assert!(!group.is_conditional());

    let result = validate_yaml(yaml);
    assert!(result.valid, "{:?}", result.errors);
    assert_eq!(result.warnings.len(), 1, "{:?}", result.warnings);
    assert!(result.warnings[0].path.ends_with("when"));
    assert!(result.warnings[0].message.contains("present but empty"));
}
