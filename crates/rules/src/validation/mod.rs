//! Catalog validation with structured errors and warnings.
//!
//! Checks what deserialization cannot: cross-group invariants (unique ids),
//! predicate sanity (no `unknown` classifications, satisfiable RAM bounds)
//! and advisory conventions. Returns a [`ValidationResult`] with errors
//! (block a run) and warnings (advisory).

mod group_checks;
mod predicate_checks;

use serde::{Deserialize, Serialize};

use crate::loader::parse_group;
use crate::schema::RuleGroup;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location, e.g. `"gpu-nvidia.when.gpu_vendor"`.
    pub path: String,
    pub message: String,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a single [`RuleGroup`] in isolation.
pub fn validate_group(group: &RuleGroup) -> ValidationResult {
    let mut result = ValidationResult::new();
    group_checks::validate_metadata(group, &mut result);
    group_checks::validate_steps(group, &mut result);
    predicate_checks::validate_predicate(group, &mut result);
    result
}

/// Validate a whole catalog: every group plus cross-group invariants.
pub fn validate_catalog(groups: &[RuleGroup]) -> ValidationResult {
    let mut result = ValidationResult::new();
    for group in groups {
        group_checks::validate_metadata(group, &mut result);
        group_checks::validate_steps(group, &mut result);
        predicate_checks::validate_predicate(group, &mut result);
    }
    group_checks::validate_unique_ids(groups, &mut result);
    result
}

/// Parse raw YAML and validate. Returns parse errors merged with validation errors.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match parse_group(yaml) {
        Ok(group) => validate_group(&group),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", e.to_string());
            result
        }
    }
}

#[cfg(test)]
mod tests;
