//! Run report handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use regtune_core::HardwareProfile;
use regtune_rules::catalog::ExcludedGroup;

use crate::audit_log::LogEntry;
use crate::result::ExecutionResult;
use crate::runner::RunState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub profile: HardwareProfile,
    /// Store backend name.
    pub store: String,
    /// Process channel name.
    pub channel: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    pub selected_groups: Vec<String>,
    pub excluded_groups: Vec<ExcludedGroup>,
    pub results: Vec<ExecutionResult>,
    pub audit: Vec<LogEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub children_written: usize,
    pub children_skipped: usize,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.results.len(),
            ..Default::default()
        };
        for result in &self.results {
            if result.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            if let Some(children) = &result.children {
                summary.children_written += children.written;
                summary.children_skipped += children.skipped;
            }
        }
        summary
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
