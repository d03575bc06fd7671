//! Rule application engine.
//!
//! Walks an assembled catalog and turns every step into an
//! [`ExecutionResult`]: store writes go through [`StoreApplyEngine`],
//! external commands through [`CommandExecutor`], and
//! [`ApplicationRunner`] drives both in catalog order. Errors never cross
//! the runner boundary; each one is converted to a failed result where it
//! happens and the run continues.

pub mod apply;
pub mod audit_log;
pub mod command;
pub mod report;
pub mod result;
pub mod runner;

pub use apply::StoreApplyEngine;
pub use audit_log::{AuditLog, AuditQuery, ExecutionPhase, LogEntry, LogLevel};
pub use command::{
    CommandError, CommandExecutor, DryRunChannel, ProcessChannel, ProcessOutput, SystemProcess,
};
pub use report::{RunReport, RunSummary};
pub use result::{ChildFailure, ChildSummary, ExecutionResult, FailureKind, Outcome};
pub use runner::{ApplicationRunner, NoopObserver, RunObserver, RunState};
