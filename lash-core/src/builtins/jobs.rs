use std::fmt::Write as _;

use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Display the status of background jobs.
#[derive(Parser)]
pub(crate) struct JobsCommand {}

impl BuiltinCommand for JobsCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        for job in context.shell.jobs_snapshot() {
            writeln!(context.stdout, "{job}")?;
        }
        Ok(ExecutionResult::success())
    }
}
