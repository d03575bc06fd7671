//! External command execution.
//!
//! Commands run synchronously, exactly once, with no timeout. Output is
//! captured and only the last stderr line surfaces in a failure reason.

use std::cell::RefCell;
use std::process::{Command, Stdio};
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use regtune_rules::schema::CommandLine;

use crate::result::{ExecutionResult, FailureKind};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command has no program to run")]
    Empty,
}

/// Exit status and captured streams of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success() -> Self {
        Self {
            status: Some(0),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Where commands are submitted.
pub trait ProcessChannel {
    fn execute(&self, line: &CommandLine) -> Result<ProcessOutput, CommandError>;

    fn name(&self) -> &'static str;
}

/// Runs commands as real child processes.
///
/// Shell lines go through `cmd /C` on Windows and `sh -c` elsewhere;
/// argument vectors are spawned directly. Stdin is closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcess;

impl SystemProcess {
    fn build(line: &CommandLine) -> Result<(String, Command), CommandError> {
        match line {
            CommandLine::Shell(script) => Ok(shell_command(script)),
            CommandLine::Args(argv) => {
                let (program, args) = argv.split_first().ok_or(CommandError::Empty)?;
                let mut command = Command::new(program);
                command.args(args);
                Ok((program.clone(), command))
            }
        }
    }
}

#[cfg(windows)]
fn shell_command(script: &str) -> (String, Command) {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(script);
    ("cmd".to_string(), command)
}

#[cfg(not(windows))]
fn shell_command(script: &str) -> (String, Command) {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    ("sh".to_string(), command)
}

impl ProcessChannel for SystemProcess {
    fn execute(&self, line: &CommandLine) -> Result<ProcessOutput, CommandError> {
        let (program, mut command) = Self::build(line)?;
        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CommandError::Spawn { program, source })?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// Records commands instead of running them; every command succeeds.
#[derive(Debug, Default)]
pub struct DryRunChannel {
    submitted: RefCell<Vec<CommandLine>>,
}

impl DryRunChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<CommandLine> {
        self.submitted.borrow().clone()
    }
}

impl ProcessChannel for DryRunChannel {
    fn execute(&self, line: &CommandLine) -> Result<ProcessOutput, CommandError> {
        debug!(command = %line, "dry run: command not executed");
        self.submitted.borrow_mut().push(line.clone());
        Ok(ProcessOutput::success())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

pub struct CommandExecutor<'c> {
    channel: &'c dyn ProcessChannel,
}

impl<'c> CommandExecutor<'c> {
    pub fn new(channel: &'c dyn ProcessChannel) -> Self {
        Self { channel }
    }

    pub fn channel_name(&self) -> &'static str {
        self.channel.name()
    }

    /// Run one command. A non-zero exit or a spawn failure becomes a failed
    /// result; nothing is raised past this call.
    pub fn run(&self, line: &CommandLine, description: &str) -> ExecutionResult {
        let started = Instant::now();
        let target = line.to_string();

        let mut result = match self.channel.execute(line) {
            Ok(output) if output.is_success() => {
                debug!(
                    command = %target,
                    stdout_bytes = output.stdout.len(),
                    "command succeeded"
                );
                ExecutionResult::succeeded(target, description)
            }
            Ok(output) => ExecutionResult::failed(
                target,
                description,
                FailureKind::CommandNonZeroExit,
                exit_reason(&output),
            ),
            Err(e) => ExecutionResult::failed(
                target,
                description,
                FailureKind::CommandSpawnFailed,
                e.to_string(),
            ),
        };
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }
}

/// `exit status N: <last non-empty stderr line>`.
fn exit_reason(output: &ProcessOutput) -> String {
    let status = match output.status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };
    let last_line = output
        .stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty());
    match last_line {
        Some(line) => format!("{status}: {line}"),
        None => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(ProcessOutput);

    impl ProcessChannel for Scripted {
        fn execute(&self, _line: &CommandLine) -> Result<ProcessOutput, CommandError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[test]
    fn non_zero_exit_reports_last_stderr_line() {
        let channel = Scripted(ProcessOutput {
            status: Some(5),
            stdout: "ignored".into(),
            stderr: "first\nAccess is denied.\n\n".into(),
        });
        let result = CommandExecutor::new(&channel)
            .run(&CommandLine::Shell("bcdedit /set x y".into()), "boot tweak");

        assert_eq!(result.failure_kind, Some(FailureKind::CommandNonZeroExit));
        assert_eq!(result.reason(), Some("exit status 5: Access is denied."));
        assert_eq!(result.target, "bcdedit /set x y");
    }

    #[test]
    fn signal_termination_without_stderr() {
        let output = ProcessOutput {
            status: None,
            ..Default::default()
        };
        assert_eq!(exit_reason(&output), "terminated by signal");
    }

    #[test]
    fn missing_program_is_spawn_failure() {
        let line = CommandLine::Args(vec!["regtune-no-such-program-xyz".into(), "--flag".into()]);
        let result = CommandExecutor::new(&SystemProcess).run(&line, "missing");

        assert_eq!(result.failure_kind, Some(FailureKind::CommandSpawnFailed));
        let reason = result.reason().unwrap();
        assert!(
            reason.starts_with("failed to spawn 'regtune-no-such-program-xyz'"),
            "{reason}"
        );
    }

    #[test]
    fn dry_run_records_and_succeeds() {
        let channel = DryRunChannel::new();
        let executor = CommandExecutor::new(&channel);
        let line = CommandLine::Args(vec!["powercfg".into(), "-list".into()]);

        assert!(executor.run(&line, "list schemes").is_success());
        assert_eq!(channel.submitted(), vec![line]);
        assert_eq!(executor.channel_name(), "dry-run");
    }

    #[cfg(unix)]
    #[test]
    fn shell_non_zero_exit_is_captured() {
        let line = CommandLine::Shell("echo boom >&2; exit 3".into());
        let result = CommandExecutor::new(&SystemProcess).run(&line, "fails");

        assert!(!result.is_success());
        assert_eq!(result.failure_kind, Some(FailureKind::CommandNonZeroExit));
        assert_eq!(result.reason(), Some("exit status 3: boom"));
    }

    #[cfg(unix)]
    #[test]
    fn shell_success() {
        let result =
            CommandExecutor::new(&SystemProcess).run(&CommandLine::Shell("true".into()), "ok");
        assert!(result.is_success());
    }
}
