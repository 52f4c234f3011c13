//! Error taxonomy shared by the registry and every command handler.

use std::io;

use thiserror::Error;

/// Process exit status produced by a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus(u8);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    pub const FAILURE: ExitStatus = ExitStatus(1);
    pub const USAGE: ExitStatus = ExitStatus(2);

    pub fn code(self) -> u8 {
        self.0
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(value: ExitStatus) -> Self {
        std::process::ExitCode::from(value.code())
    }
}

/// Every way a command invocation can end other than success.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Validation(String),
    #[error("{dependency} is not available: {reason}")]
    DependencyMissing {
        dependency: &'static str,
        reason: String,
    },
    #[error("{0}")]
    ExternalCall(String),
    #[error("{}", describe_unknown(name, known))]
    UnknownCommand { name: String, known: Vec<String> },
    #[error("'{0}' is not an integer")]
    MalformedInput(String),
    #[error("input closed before the game finished")]
    InputClosed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        CommandError::Validation(message.into())
    }

    pub fn external(context: &str, err: impl std::fmt::Display) -> Self {
        CommandError::ExternalCall(format!("{context}: {err}"))
    }

    /// Exit status reported to the shell when this error ends a command.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandError::UnknownCommand { .. } => ExitStatus::USAGE,
            _ => ExitStatus::FAILURE,
        }
    }
}

fn describe_unknown(name: &str, known: &[String]) -> String {
    let known = known.join(", ");
    if name.is_empty() {
        format!("no command given (known commands: {known})")
    } else {
        format!("unknown command '{name}' (known commands: {known})")
    }
}
