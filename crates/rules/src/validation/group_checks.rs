//! Group-level checks: metadata conventions, step lists, id uniqueness.

use std::collections::{HashMap, HashSet};

use crate::schema::{RegValue, RuleGroup, StoreRoot, TweakStep};

use super::ValidationResult;

pub(super) fn validate_metadata(group: &RuleGroup, result: &mut ValidationResult) {
    let id = group.id();
    if !is_kebab_case(id) {
        result.error(
            format!("{id}.metadata.id"),
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                id
            ),
        );
    }
    if group.name().trim().is_empty() {
        result.warn(format!("{id}.metadata.name"), "group has no display name");
    }
}

pub(super) fn validate_steps(group: &RuleGroup, result: &mut ValidationResult) {
    let id = group.id();
    if group.steps.is_empty() {
        result.error(format!("{id}.steps"), "group must contain at least one step");
        return;
    }

    // (root, path, value name) -> first value written, for conflicting-write detection.
    let mut written: HashMap<(StoreRoot, String, String), &RegValue> = HashMap::new();

    for (index, step) in group.steps.iter().enumerate() {
        let path = format!("{id}.steps[{index}]");
        if step.description().trim().is_empty() {
            result.warn(&path, "step has no description");
        }
        let TweakStep::Registry(entry) = step else {
            continue;
        };
        if entry.is_recursive() {
            continue;
        }
        for (name, value) in entry.values() {
            let key = (entry.root(), entry.path().to_string().to_lowercase(), name.to_lowercase());
            match written.get(&key) {
                Some(previous) if *previous != value => {
                    result.warn(
                        format!("{path}.values.{name}"),
                        format!(
                            "'{}' is written twice in this group with different values ({} then {})",
                            name, previous, value
                        ),
                    );
                }
                Some(_) => {}
                None => {
                    written.insert(key, value);
                }
            }
        }
    }
}

pub(super) fn validate_unique_ids(groups: &[RuleGroup], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for group in groups {
        if !seen.insert(group.id()) {
            result.error(
                format!("{}.metadata.id", group.id()),
                format!("duplicate group id '{}'", group.id()),
            );
        }
    }
}

/// Check if a string is valid kebab-case: `^[a-z0-9]+(-[a-z0-9]+)*$`
fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}
