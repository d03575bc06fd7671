//! In-memory structured audit log for one run.
//!
//! Entries are kept in arrival order and capped at a configurable maximum
//! (default 1000) with FIFO eviction. The runner owns the log, so no
//! locking is needed.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity level for audit log entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Numeric severity for comparison (higher = more severe).
    pub fn as_severity(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
        }
    }
}

/// Part of the run that produced the entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    Selection,
    GroupStart,
    StoreApply,
    ChildWalk,
    Command,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub group_id: String,
    pub level: LogLevel,
    pub phase: ExecutionPhase,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Filters for [`AuditLog::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Minimum log level (inclusive).
    pub level: Option<LogLevel>,
    pub phase: Option<ExecutionPhase>,
    pub group_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
}

impl AuditLog {
    pub const DEFAULT_MAX_ENTRIES: usize = 1000;

    pub fn new() -> Self {
        Self::with_max_entries(Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max.max(1),
        }
    }

    pub fn log(
        &mut self,
        group_id: &str,
        level: LogLevel,
        phase: ExecutionPhase,
        message: impl Into<String>,
    ) {
        self.log_with_details(group_id, level, phase, message, None);
    }

    pub fn log_with_details(
        &mut self,
        group_id: &str,
        level: LogLevel,
        phase: ExecutionPhase,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) {
        self.entries.push_back(LogEntry {
            timestamp: Utc::now(),
            group_id: group_id.to_string(),
            level,
            phase,
            message: message.into(),
            details,
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Matching entries, newest first.
    pub fn query(&self, params: &AuditQuery) -> Vec<LogEntry> {
        let min_severity = params.level.map(|l| l.as_severity()).unwrap_or(0);
        self.entries
            .iter()
            .rev()
            .filter(|e| e.level.as_severity() >= min_severity)
            .filter(|e| params.phase.map_or(true, |p| e.phase == p))
            .filter(|e| {
                params
                    .group_id
                    .as_deref()
                    .map_or(true, |id| e.group_id == id)
            })
            .take(params.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// All retained entries in arrival order.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries.into()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
