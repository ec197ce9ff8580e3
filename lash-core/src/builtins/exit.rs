use clap::Parser;

use crate::builtins::{BuiltinCommand, exit_code_from_status};
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::{ExecutionControlFlow, ExecutionResult};

/// Exits the shell.
#[derive(Parser)]
pub(crate) struct ExitCommand {
    /// The exit code to return.
    #[arg(allow_negative_numbers = true)]
    code: Option<i64>,
}

impl BuiltinCommand for ExitCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        let code = self.code.map_or_else(
            || context.shell.last_exit_code(),
            exit_code_from_status,
        );

        Ok(ExecutionResult {
            next_control_flow: ExecutionControlFlow::ExitShell,
            ..ExecutionResult::new(code)
        })
    }
}
