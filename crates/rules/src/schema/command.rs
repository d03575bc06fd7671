//! External command steps for tweaks the store cannot express.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SchemaError;

/// How a command is handed to the process channel.
///
/// The two forms are never mixed: a shell line is interpreted by the
/// platform shell, an argument vector is spawned directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandLine {
    Shell(String),
    Args(Vec<String>),
}

impl CommandLine {
    /// The program that will be looked up on spawn, for error messages.
    pub fn program(&self) -> &str {
        match self {
            CommandLine::Shell(line) => line.split_whitespace().next().unwrap_or(""),
            CommandLine::Args(argv) => argv.first().map(String::as_str).unwrap_or(""),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandLine::Shell(line) => write!(f, "{line}"),
            CommandLine::Args(argv) => {
                let rendered: Vec<String> = argv
                    .iter()
                    .map(|arg| {
                        if arg.is_empty() || arg.contains(char::is_whitespace) {
                            format!("\"{}\"", arg.replace('"', "\\\""))
                        } else {
                            arg.clone()
                        }
                    })
                    .collect();
                write!(f, "{}", rendered.join(" "))
            }
        }
    }
}

/// A command step with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCommand", into = "RawCommand")]
pub struct CommandSpec {
    pub line: CommandLine,
    pub description: String,
}

impl CommandSpec {
    pub fn shell(line: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            line: CommandLine::Shell(line.into()),
            description: description.into(),
        }
    }

    /// Argument-vector command. Fails on an empty vector.
    pub fn args<I, S>(argv: I, description: impl Into<String>) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        if argv.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(SchemaError::EmptyCommand);
        }
        Ok(Self {
            line: CommandLine::Args(argv),
            description: description.into(),
        })
    }
}

/// A command exactly as authored in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argv: Option<Vec<String>>,
    #[serde(default)]
    pub description: String,
}

impl TryFrom<RawCommand> for CommandSpec {
    type Error = SchemaError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        match (raw.shell, raw.argv) {
            (Some(_), Some(_)) => Err(SchemaError::MixedCommandForm),
            (Some(line), None) if !line.trim().is_empty() => {
                Ok(CommandSpec::shell(line, raw.description))
            }
            (None, Some(argv)) => CommandSpec::args(argv, raw.description),
            _ => Err(SchemaError::EmptyCommand),
        }
    }
}

impl From<CommandSpec> for RawCommand {
    fn from(spec: CommandSpec) -> Self {
        let (shell, argv) = match spec.line {
            CommandLine::Shell(line) => (Some(line), None),
            CommandLine::Args(argv) => (None, Some(argv)),
        };
        RawCommand {
            shell,
            argv,
            description: spec.description,
        }
    }
}
