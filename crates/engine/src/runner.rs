//! Catalog execution in fixed order with per-step failure isolation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use regtune_rules::catalog::{Catalog, ExclusionReason};
use regtune_rules::schema::{RuleGroup, TweakStep};
use regtune_store::HierarchicalStore;

use crate::apply::StoreApplyEngine;
use crate::audit_log::{AuditLog, ExecutionPhase, LogLevel};
use crate::command::{CommandExecutor, ProcessChannel};
use crate::report::RunReport;
use crate::result::ExecutionResult;

/// Lifecycle of one run. There is no failed terminal state: a run always
/// completes once every step has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
}

/// Progress callbacks for a presentation layer.
pub trait RunObserver {
    fn group_started(&mut self, _group: &RuleGroup, _position: usize, _total: usize) {}

    fn step_finished(&mut self, _result: &ExecutionResult) {}
}

pub struct NoopObserver;

impl RunObserver for NoopObserver {}

pub struct ApplicationRunner<'a> {
    engine: StoreApplyEngine<'a>,
    executor: CommandExecutor<'a>,
    state: RunState,
    audit: AuditLog,
    audit_capacity: usize,
}

impl<'a> ApplicationRunner<'a> {
    pub fn new(store: &'a dyn HierarchicalStore, channel: &'a dyn ProcessChannel) -> Self {
        Self {
            engine: StoreApplyEngine::new(store),
            executor: CommandExecutor::new(channel),
            state: RunState::NotStarted,
            audit: AuditLog::new(),
            audit_capacity: AuditLog::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_audit_capacity(mut self, max_entries: usize) -> Self {
        self.audit_capacity = max_entries;
        self.audit = AuditLog::with_max_entries(max_entries);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Audit entries of the most recent run.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Execute `groups` in order and return one result per step.
    pub fn run(&mut self, groups: &[RuleGroup]) -> Vec<ExecutionResult> {
        self.run_observed(groups, &mut NoopObserver)
    }

    pub fn run_observed(
        &mut self,
        groups: &[RuleGroup],
        observer: &mut dyn RunObserver,
    ) -> Vec<ExecutionResult> {
        self.begin();
        let results = self.dispatch(groups, observer);
        self.finish(&results);
        results
    }

    /// Execute an assembled catalog and build the full report.
    pub fn run_catalog(&mut self, catalog: &Catalog, observer: &mut dyn RunObserver) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        self.begin();
        info!(
            run_id = %run_id,
            profile = %catalog.profile,
            groups = catalog.groups.len(),
            steps = catalog.step_count(),
            "run started"
        );

        for excluded in &catalog.excluded {
            let message = match &excluded.reason {
                ExclusionReason::Disabled => "group disabled".to_string(),
                ExclusionReason::PredicateFalse { predicate } => {
                    format!("predicate not met: {predicate}")
                }
            };
            self.audit
                .log(&excluded.id, LogLevel::Info, ExecutionPhase::Selection, message);
        }

        let results = self.dispatch(&catalog.groups, observer);
        self.finish(&results);

        RunReport {
            run_id,
            profile: catalog.profile,
            store: self.engine.store_name().to_string(),
            channel: self.executor.channel_name().to_string(),
            started_at,
            finished_at: Utc::now(),
            state: self.state,
            selected_groups: catalog.group_ids().into_iter().map(String::from).collect(),
            excluded_groups: catalog.excluded.clone(),
            results,
            audit: self.audit.entries().cloned().collect(),
        }
    }

    fn begin(&mut self) {
        self.state = RunState::Running;
        self.audit = AuditLog::with_max_entries(self.audit_capacity);
    }

    fn dispatch(
        &mut self,
        groups: &[RuleGroup],
        observer: &mut dyn RunObserver,
    ) -> Vec<ExecutionResult> {
        let mut results = Vec::new();
        for (position, group) in groups.iter().enumerate() {
            observer.group_started(group, position, groups.len());
            info!(
                group_id = %group.id(),
                stage = %group.stage,
                steps = group.steps.len(),
                "applying group"
            );
            self.audit.log(
                group.id(),
                LogLevel::Info,
                ExecutionPhase::GroupStart,
                format!("stage {}: {}", group.stage.number(), group.stage.title()),
            );

            for step in &group.steps {
                let result = match step {
                    TweakStep::Registry(entry) => self.engine.apply(entry),
                    TweakStep::Command(cmd) => self.executor.run(&cmd.line, &cmd.description),
                }
                .with_group(group.id());
                self.record(step, &result);
                observer.step_finished(&result);
                results.push(result);
            }
        }
        results
    }

    fn finish(&mut self, results: &[ExecutionResult]) {
        self.state = RunState::Completed;
        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            total = results.len(),
            succeeded = results.len() - failed,
            failed,
            "run completed"
        );
        self.audit.log(
            "",
            if failed == 0 { LogLevel::Info } else { LogLevel::Warning },
            ExecutionPhase::Complete,
            format!("{} steps, {} failed", results.len(), failed),
        );
    }

    fn record(&mut self, step: &TweakStep, result: &ExecutionResult) {
        let phase = match step {
            TweakStep::Registry(_) => ExecutionPhase::StoreApply,
            TweakStep::Command(_) => ExecutionPhase::Command,
        };

        match result.reason() {
            None => {
                info!(
                    group_id = %result.group_id,
                    target = %result.target,
                    duration_ms = result.duration_ms,
                    "step succeeded"
                );
                self.audit
                    .log(&result.group_id, LogLevel::Info, phase, &result.description);
            }
            Some(reason) => {
                warn!(
                    group_id = %result.group_id,
                    target = %result.target,
                    kind = ?result.failure_kind,
                    reason,
                    "step failed"
                );
                self.audit.log_with_details(
                    &result.group_id,
                    LogLevel::Error,
                    phase,
                    format!("{}: {}", result.description, reason),
                    Some(serde_json::json!({
                        "target": result.target,
                        "failure_kind": result.failure_kind,
                    })),
                );
            }
        }

        if let Some(children) = &result.children {
            if children.skipped > 0 || children.enumeration_error.is_some() {
                self.audit.log_with_details(
                    &result.group_id,
                    LogLevel::Warning,
                    ExecutionPhase::ChildWalk,
                    format!(
                        "{} of {} children skipped under {}",
                        children.skipped,
                        children.written + children.skipped,
                        result.target
                    ),
                    serde_json::to_value(children).ok(),
                );
            }
        }
    }
}
