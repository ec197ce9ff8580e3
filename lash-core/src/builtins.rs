//! Infrastructure for shell built-in commands, and the commands themselves.
//!
//! Fixed builtins (`eval`, `source`, `return`, ...) act on the interpreter itself and take
//! priority over everything else during dispatch. The default command plugins (`echo`, `cd`,
//! `cat`, ...) are ordinary [`Command`](crate::Command)s that a host may leave out or replace.

use std::future::Future;

use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

mod break_;
mod cat;
mod cd;
mod colon;
mod continue_;
mod dot;
mod echo;
mod env_;
mod eval;
mod exit;
mod export;
mod factory;
mod false_;
mod history;
mod jobs;
mod pwd;
mod return_;
mod set;
mod sleep;
mod true_;
mod unset;
mod wait;

pub(crate) use factory::{default_commands, fixed_builtins};
pub use factory::{builtin, simple_builtin};

/// Trait implemented by built-in commands whose arguments are parsed with `clap`.
pub trait BuiltinCommand: clap::Parser + Send + Sync {
    /// Instantiates the built-in command with the given arguments.
    ///
    /// # Arguments
    ///
    /// * `args` - The arguments to the command, starting with its name.
    fn new<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        Self::try_parse_from(args)
    }

    /// Executes the built-in command in the provided context.
    ///
    /// # Arguments
    ///
    /// * `context` - The context in which the command is being executed.
    fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> impl Future<Output = Result<ExecutionResult, error::Error>> + Send;
}

/// Trait implemented by built-in commands that interpret their raw arguments themselves.
pub trait SimpleCommand: Send + Sync {
    /// Returns a one-line description of the command.
    fn description() -> &'static str;

    /// Executes the built-in command in the provided context.
    ///
    /// # Arguments
    ///
    /// * `context` - The context in which the command is being executed.
    fn execute(
        context: &mut ExecutionContext<'_>,
    ) -> impl Future<Output = Result<ExecutionResult, error::Error>> + Send;
}

/// Converts a user-supplied status to an exit code, modulo 256.
fn exit_code_from_status(status: i64) -> u8 {
    u8::try_from(status.rem_euclid(256)).unwrap_or_default()
}
