//! Checked external command execution.
//!
//! Stage steps shell out to `git`, `mvn`, and friends with their output
//! passed straight through to the run log. A step declares an optional
//! title (logged before running), an optional working directory, and an
//! optional fatal error message. A non-zero exit is only an error when the
//! step declared one; otherwise the exit code is returned as a status value
//! for the caller to interpret.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::output;

/// Error type for checked command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The command could not be spawned at all.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited non-zero and the step declared a fatal message.
    #[error("{message} ({code}).")]
    Failed { message: String, code: i32 },
}

/// Result type for checked command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// An external command with per-step logging and failure policy.
#[derive(Debug, Clone)]
pub struct CheckedCommand {
    program: String,
    args: Vec<String>,
    title: Option<String>,
    cwd: Option<PathBuf>,
    error: Option<String>,
}

impl CheckedCommand {
    /// Create a new checked command.
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), title: None, cwd: None, error: None }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a human-readable title logged before running.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Declare the fatal error message for a non-zero exit.
    #[must_use]
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Run the command, inheriting stdio so output lands in the run log.
    ///
    /// Returns the exit code. A non-zero exit raises [`CommandError::Failed`]
    /// only when a fatal error message was declared.
    pub fn run(&self) -> CommandResult<i32> {
        if let Some(ref title) = self.title {
            output::show_title(&format!("{title}..."));
        }

        tracing::debug!(program = %self.program, args = ?self.args, cwd = ?self.cwd, "running command");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd
            .status()
            .map_err(|source| CommandError::Spawn { program: self.program.clone(), source })?;

        // Killed by signal on unix; treated like any other non-zero status.
        let code = status.code().unwrap_or(-1);

        if code != 0 {
            if let Some(ref message) = self.error {
                return Err(CommandError::Failed { message: message.clone(), code });
            }
        }

        Ok(code)
    }
}
