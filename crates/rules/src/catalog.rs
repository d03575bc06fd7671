//! Hardware-conditioned catalog assembly.
//!
//! [`RuleCatalogBuilder`] turns the full set of loaded groups into the
//! ordered list a run executes. It performs no I/O and cannot fail: an
//! unclassified machine simply selects no conditional group.

use serde::{Deserialize, Serialize};
use tracing::debug;

use regtune_core::HardwareProfile;

use crate::schema::{RuleGroup, Stage};

/// Why a group was left out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// `metadata.enabled` is false.
    Disabled,
    /// The inclusion predicate evaluated false against the profile.
    PredicateFalse { predicate: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedGroup {
    pub id: String,
    pub stage: Stage,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

/// The groups selected for one profile, in execution order.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub profile: HardwareProfile,
    pub groups: Vec<RuleGroup>,
    pub excluded: Vec<ExcludedGroup>,
}

impl Catalog {
    pub fn group_ids(&self) -> Vec<&str> {
        self.groups.iter().map(RuleGroup::id).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.groups.iter().any(|g| g.id() == id)
    }

    /// Total number of steps the runner will dispatch.
    pub fn step_count(&self) -> usize {
        self.groups.iter().map(|g| g.steps.len()).sum()
    }
}

pub struct RuleCatalogBuilder {
    groups: Vec<RuleGroup>,
}

impl RuleCatalogBuilder {
    pub fn new(groups: Vec<RuleGroup>) -> Self {
        Self { groups }
    }

    /// Select the groups that apply to `profile`.
    ///
    /// Order is stage first, then `order`; groups that tie on both keep
    /// the order they were given in.
    pub fn build(&self, profile: &HardwareProfile) -> Catalog {
        let mut selected = Vec::new();
        let mut excluded = Vec::new();

        for group in &self.groups {
            let reason = if !group.metadata.enabled {
                Some(ExclusionReason::Disabled)
            } else if !group.applies_to(profile) {
                Some(ExclusionReason::PredicateFalse {
                    predicate: group
                        .when
                        .as_ref()
                        .map(|p| p.describe())
                        .unwrap_or_default(),
                })
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    debug!(group_id = %group.id(), ?reason, "group excluded");
                    excluded.push(ExcludedGroup {
                        id: group.id().to_string(),
                        stage: group.stage,
                        reason,
                    });
                }
                None => selected.push(group.clone()),
            }
        }

        selected.sort_by_key(|g| (g.stage, g.order));
        excluded.sort_by_key(|e| e.stage);

        Catalog {
            profile: *profile,
            groups: selected,
            excluded,
        }
    }
}
