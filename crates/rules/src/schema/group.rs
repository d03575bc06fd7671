//! Rule group document: one optimization stage batch.

use serde::{Deserialize, Serialize};

use regtune_core::HardwareProfile;

use super::{CommandSpec, CommonMetadata, Predicate, RuleEntry, Stage};

/// Document kind accepted by the catalog loader.
pub const TWEAK_GROUP_KIND: &str = "TweakGroup";

/// Schema version accepted by the catalog loader.
pub const API_VERSION: &str = "v1";

/// One step of a group: a store write or an external command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweakStep {
    Registry(RuleEntry),
    Command(CommandSpec),
}

impl TweakStep {
    pub fn description(&self) -> &str {
        match self {
            TweakStep::Registry(entry) => entry.description(),
            TweakStep::Command(cmd) => &cmd.description,
        }
    }

    pub fn as_entry(&self) -> Option<&RuleEntry> {
        match self {
            TweakStep::Registry(entry) => Some(entry),
            TweakStep::Command(_) => None,
        }
    }

    pub fn as_command(&self) -> Option<&CommandSpec> {
        match self {
            TweakStep::Registry(_) => None,
            TweakStep::Command(cmd) => Some(cmd),
        }
    }
}

impl From<RuleEntry> for TweakStep {
    fn from(entry: RuleEntry) -> Self {
        TweakStep::Registry(entry)
    }
}

impl From<CommandSpec> for TweakStep {
    fn from(cmd: CommandSpec) -> Self {
        TweakStep::Command(cmd)
    }
}

/// An ordered batch of steps for one stage, optionally hardware-conditioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroup {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub stage: Stage,
    /// Tie-breaker between groups of the same stage (lower runs first).
    #[serde(default)]
    pub order: u32,
    /// Inclusion predicate; `None` means the group always applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Predicate>,
    #[serde(default)]
    pub steps: Vec<TweakStep>,
}

impl RuleGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, stage: Stage) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: TWEAK_GROUP_KIND.to_string(),
            metadata: CommonMetadata::new(id, name),
            stage,
            order: 0,
            when: None,
            steps: Vec::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.when = Some(predicate);
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_step(mut self, step: impl Into<TweakStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn is_conditional(&self) -> bool {
        self.when.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Whether the inclusion predicate holds for `profile`.
    pub fn applies_to(&self, profile: &HardwareProfile) -> bool {
        self.when.as_ref().map_or(true, |p| p.matches(profile))
    }

    pub fn entries(&self) -> impl Iterator<Item = &RuleEntry> {
        self.steps.iter().filter_map(TweakStep::as_entry)
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.steps.iter().filter_map(TweakStep::as_command)
    }
}
