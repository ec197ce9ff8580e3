use std::fmt::Write as _;

use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Display the command history.
#[derive(Parser)]
pub(crate) struct HistoryCommand {
    /// Show only the last N entries.
    count: Option<usize>,
}

impl BuiltinCommand for HistoryCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        let history = context.shell.history();
        let skip = self
            .count
            .map_or(0, |count| history.len().saturating_sub(count));

        for (i, line) in history.iter().enumerate().skip(skip) {
            writeln!(context.stdout, "{:>5}  {line}", i + 1)?;
        }
        Ok(ExecutionResult::success())
    }
}
