//! The contract between the interpreter and the commands it dispatches to.

use std::fmt::Write as _;

use crate::error::Error;
use crate::interp::{self, ExecutionParameters};
use crate::results::ExecutionResult;
use crate::sinks::SharedBuffer;
use crate::Shell;

/// Represents the context for executing a command.
///
/// A context is created fresh for each pipeline segment. Whatever the command leaves in
/// `stdout` and `stderr` is subject to the segment's redirections once it returns.
pub struct ExecutionContext<'a> {
    /// The shell in which the command is being executed.
    pub shell: &'a Shell,
    /// The name of the command being executed.
    pub command_name: String,
    /// The arguments to the command, not including its name.
    pub args: Vec<String>,
    /// Snapshot of the working directory when the command was dispatched.
    pub working_dir: String,
    /// Text available on the command's standard input.
    pub stdin: String,
    /// Accumulated standard output.
    pub stdout: String,
    /// Accumulated standard error.
    pub stderr: String,
    pub(crate) params: &'a ExecutionParameters,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn new(
        shell: &'a Shell,
        params: &'a ExecutionParameters,
        command_name: String,
        args: Vec<String>,
        stdin: String,
    ) -> Self {
        Self {
            shell,
            command_name,
            args,
            working_dir: shell.working_dir(),
            stdin,
            stdout: String::new(),
            stderr: String::new(),
            params,
        }
    }

    /// Resolves a possibly relative path against the context's working directory.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to resolve.
    pub fn resolve_path(&self, path: &str) -> String {
        self.shell.fs().resolve(&self.working_dir, path)
    }

    /// Returns the value of a variable, if set.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable's name.
    pub fn env_var(&self, name: &str) -> Option<String> {
        self.shell.env_var(name)
    }

    /// Runs shell text in the calling session, appending its output to this context's
    /// accumulators. The text receives this context's standard input.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to run.
    pub async fn run_nested(&mut self, text: &str) -> Result<ExecutionResult, Error> {
        let mut params = self.params.capture();
        params.stdin = Some(SharedBuffer::from(std::mem::take(&mut self.stdin)));

        let result = interp::execute_text(self.shell, text, &params).await;

        self.stdout.push_str(&params.stdout.contents());
        self.stderr.push_str(&params.stderr.contents());
        result
    }

    /// Appends an error message, prefixed with the command name, to standard error.
    ///
    /// # Arguments
    ///
    /// * `message` - The message, without a trailing newline.
    pub fn report_error(&mut self, message: impl std::fmt::Display) {
        let _ = writeln!(self.stderr, "{}: {message}", self.command_name);
    }
}

/// A named command the interpreter can dispatch to.
///
/// Registered plugins are looked up by exact name after shell builtins and functions.
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Returns the name the command is invoked by.
    fn name(&self) -> &str;

    /// Returns a one-line, human-readable description.
    fn description(&self) -> &str;

    /// Executes the command.
    ///
    /// Returning an error is equivalent to writing the error to standard error and exiting
    /// with the error's exit code.
    ///
    /// # Arguments
    ///
    /// * `context` - The context in which the command is being executed.
    async fn execute(&self, context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, Error>;
}
