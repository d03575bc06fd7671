//! Inclusion predicate checks.

use crate::schema::{RuleGroup, Stage};

use super::ValidationResult;

pub(super) fn validate_predicate(group: &RuleGroup, result: &mut ValidationResult) {
    let id = group.id();

    let Some(predicate) = &group.when else {
        if group.stage == Stage::Gpu {
            result.warn(
                format!("{id}.when"),
                "gpu-stage group has no gpu_vendor predicate and runs on every machine",
            );
        }
        return;
    };

    if predicate.is_empty() {
        result.warn(format!("{id}.when"), "`when` is present but empty; the group always applies");
    }

    if let Some(vendor) = predicate.gpu_vendor {
        if !vendor.is_known() {
            result.error(
                format!("{id}.when.gpu_vendor"),
                "predicate on an unknown GPU vendor can never be selected",
            );
        }
    } else if group.stage == Stage::Gpu {
        result.warn(
            format!("{id}.when"),
            "gpu-stage group has no gpu_vendor predicate and runs on every machine",
        );
    }

    if let Some(medium) = predicate.storage_medium {
        if !medium.is_known() {
            result.error(
                format!("{id}.when.storage_medium"),
                "predicate on an unknown storage medium can never be selected",
            );
        }
    }

    if let Some(ram) = &predicate.ram_gib {
        if ram.bounds().is_none() {
            result.error(
                format!("{id}.when.ram_gib"),
                "RAM bounds contradict each other; no machine can match",
            );
        }
    }
}
