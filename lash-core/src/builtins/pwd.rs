use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Display the current working directory.
#[derive(Parser)]
pub(crate) struct PwdCommand {}

impl BuiltinCommand for PwdCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        context.stdout.push_str(&context.working_dir);
        context.stdout.push('\n');
        Ok(ExecutionResult::success())
    }
}
