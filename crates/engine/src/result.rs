//! Per-step outcome records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed { reason: String },
}

/// What kind of operation produced a failure.
///
/// Enumeration exhaustion is not in this list: it ends a child walk
/// normally and is never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    StoreOpenFailed,
    StoreWriteFailed,
    CommandSpawnFailed,
    CommandNonZeroExit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildFailure {
    pub child: String,
    pub reason: String,
}

/// Summary of a recursive walk over a key's direct children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub written: usize,
    pub skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ChildFailure>,
    /// Set when enumeration itself failed part-way; the walk stops there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumeration_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub group_id: String,
    pub description: String,
    /// Store location or rendered command line.
    pub target: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<ChildSummary>,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn succeeded(target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            group_id: String::new(),
            description: description.into(),
            target: target.into(),
            outcome: Outcome::Succeeded,
            failure_kind: None,
            children: None,
            duration_ms: 0,
        }
    }

    pub fn failed(
        target: impl Into<String>,
        description: impl Into<String>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            group_id: String::new(),
            description: description.into(),
            target: target.into(),
            outcome: Outcome::Failed {
                reason: reason.into(),
            },
            failure_kind: Some(kind),
            children: None,
            duration_ms: 0,
        }
    }

    pub fn with_group(mut self, group_id: &str) -> Self {
        self.group_id = group_id.to_string();
        self
    }

    pub fn with_children(mut self, children: ChildSummary) -> Self {
        self.children = Some(children);
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded)
    }

    pub fn reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Succeeded => None,
            Outcome::Failed { reason } => Some(reason),
        }
    }
}
