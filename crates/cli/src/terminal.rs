use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};
use tracing::debug;

use regtune_core::HardwareProfile;
use regtune_engine::{ExecutionResult, RunObserver, RunReport};
use regtune_rules::catalog::{Catalog, ExclusionReason};
use regtune_rules::loader::{LoadResult, LoadStatus};
use regtune_rules::schema::RuleGroup;
use regtune_rules::validation::ValidationResult;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Cyan;
    const STAGE: Color = Color::Cyan;
    const OK: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const WARN: Color = Color::Yellow;
    const VALUE: Color = Color::Yellow;
    const DIM: Color = Color::DarkGrey;
}

const RULE_WIDTH: usize = 60;

/// Terminal rendering for runs, plans and validation output.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the run banner with the hardware profile in use.
    pub fn print_banner(&self, profile: &HardwareProfile, store: &str, dry_run: bool) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", "=".repeat(RULE_WIDTH))),
            ResetColor,
            Print("  regtune"),
            SetForegroundColor(Colors::DIM),
            Print(if dry_run { " (dry run)\n" } else { "\n" }),
            ResetColor,
            Print("\nGraphics hardware: "),
            SetForegroundColor(Colors::VALUE),
            Print(format!("{}\n", profile.gpu_vendor)),
            ResetColor,
            Print("Storage medium:    "),
            SetForegroundColor(Colors::VALUE),
            Print(format!("{}\n", profile.storage_medium)),
            ResetColor,
            Print("Memory:            "),
            SetForegroundColor(Colors::VALUE),
            Print(format!("{} GiB\n", profile.ram_gib)),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print(format!("Store backend:     {}\n", store)),
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", "=".repeat(RULE_WIDTH))),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_group_header(&self, group: &RuleGroup, position: usize, total: usize) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::STAGE),
            Print(format!(
                "[{}/{}] Stage {} {}: {}",
                position + 1,
                total,
                group.stage.number(),
                group.stage.title(),
                group.name()
            )),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print(format!(" ({})\n", group.id())),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_result(&self, result: &ExecutionResult) -> Result<()> {
        let mut stdout = io::stdout();
        let (color, label) = status_label(result);
        execute!(
            stdout,
            Print(format!("  {} ", truncate(&result.description, 48))),
            SetForegroundColor(color),
            Print(format!("[{}]", label)),
            ResetColor,
        )?;
        if let Some(reason) = result.reason() {
            execute!(
                stdout,
                SetForegroundColor(Colors::ERROR),
                Print(format!(" {}", truncate(reason, 120))),
                ResetColor,
            )?;
        }
        if let Some(children) = &result.children {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print(format!(
                    " {} children written, {} skipped",
                    children.written, children.skipped
                )),
                ResetColor,
            )?;
        }
        execute!(stdout, Print("\n"))?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_summary(&self, report: &RunReport) -> Result<()> {
        let summary = report.summary();
        let mut stdout = io::stdout();
        let color = if summary.failed == 0 { Colors::OK } else { Colors::WARN };
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", "=".repeat(RULE_WIDTH))),
            SetForegroundColor(color),
            Print(format!(
                "  {} steps: {} succeeded, {} failed\n",
                summary.total, summary.succeeded, summary.failed
            )),
            ResetColor,
        )?;
        if summary.children_skipped > 0 {
            execute!(
                stdout,
                SetForegroundColor(Colors::WARN),
                Print(format!(
                    "  {} child keys skipped during recursive writes\n",
                    summary.children_skipped
                )),
                ResetColor,
            )?;
        }
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("  run {} in {} ms\n", report.run_id, report.elapsed_ms())),
            ResetColor,
            SetForegroundColor(Colors::WARN),
            Print("  A restart is required for all changes to take effect.\n"),
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", "=".repeat(RULE_WIDTH))),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the groups a profile selects and the reason each other group is left out.
    pub fn print_plan(&self, catalog: &Catalog) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Plan for {}\n", catalog.profile)),
            ResetColor,
        )?;
        for group in &catalog.groups {
            execute!(
                stdout,
                SetForegroundColor(Colors::OK),
                Print("  + "),
                ResetColor,
                Print(format!(
                    "{:<2} {:<14} {:<28} {} steps\n",
                    group.stage.number(),
                    group.stage.to_string(),
                    group.id(),
                    group.steps.len()
                )),
            )?;
        }
        for excluded in &catalog.excluded {
            let reason = match &excluded.reason {
                ExclusionReason::Disabled => "disabled".to_string(),
                ExclusionReason::PredicateFalse { predicate } => format!("requires {predicate}"),
            };
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print(format!(
                    "  - {:<2} {:<14} {:<28} {}\n",
                    excluded.stage.number(),
                    excluded.stage.to_string(),
                    excluded.id,
                    reason
                )),
                ResetColor,
            )?;
        }
        execute!(
            stdout,
            Print(format!(
                "\n{} groups, {} steps selected; {} excluded\n",
                catalog.groups.len(),
                catalog.step_count(),
                catalog.excluded.len()
            )),
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_load_failures(&self, results: &[LoadResult]) -> Result<usize> {
        let mut stdout = io::stdout();
        let mut failed = 0;
        for result in results {
            if let LoadStatus::Failed { error } = &result.status {
                failed += 1;
                execute!(
                    stdout,
                    SetForegroundColor(Colors::ERROR),
                    Print(format!("  error {}: {}\n", result.path.display(), error)),
                    ResetColor,
                )?;
            }
        }
        stdout.flush()?;
        Ok(failed)
    }

    pub fn print_validation(&self, result: &ValidationResult) -> Result<()> {
        let mut stdout = io::stdout();
        for error in &result.errors {
            execute!(
                stdout,
                SetForegroundColor(Colors::ERROR),
                Print(format!("  error   {}: {}\n", error.path, error.message)),
                ResetColor,
            )?;
        }
        for warning in &result.warnings {
            execute!(
                stdout,
                SetForegroundColor(Colors::WARN),
                Print(format!("  warning {}: {}\n", warning.path, warning.message)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Renders run progress as it happens.
pub struct TerminalObserver<'t> {
    terminal: &'t Terminal,
}

impl<'t> TerminalObserver<'t> {
    pub fn new(terminal: &'t Terminal) -> Self {
        Self { terminal }
    }
}

impl RunObserver for TerminalObserver<'_> {
    fn group_started(&mut self, group: &RuleGroup, position: usize, total: usize) {
        if let Err(e) = self.terminal.print_group_header(group, position, total) {
            debug!(error = %e, "terminal write failed");
        }
    }

    fn step_finished(&mut self, result: &ExecutionResult) {
        if let Err(e) = self.terminal.print_result(result) {
            debug!(error = %e, "terminal write failed");
        }
    }
}

fn status_label(result: &ExecutionResult) -> (Color, &'static str) {
    match &result.children {
        _ if !result.is_success() => (Colors::ERROR, "ERROR"),
        Some(children) if children.skipped > 0 => (Colors::WARN, "PARTIAL"),
        _ => (Colors::OK, "COMPLETED"),
    }
}

/// Truncate to `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
