use clap::Parser;

use crate::builtins::{BuiltinCommand, exit_code_from_status};
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::{ExecutionControlFlow, ExecutionResult};

/// Returns from a shell function or sourced script.
#[derive(Parser)]
pub(crate) struct ReturnCommand {
    /// Status to return; defaults to the status of the last command.
    #[arg(allow_negative_numbers = true)]
    code: Option<i64>,
}

impl BuiltinCommand for ReturnCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        let code = self.code.map_or_else(
            || context.shell.last_exit_code(),
            exit_code_from_status,
        );

        Ok(ExecutionResult {
            next_control_flow: ExecutionControlFlow::ReturnFromFunctionOrScript,
            ..ExecutionResult::new(code)
        })
    }
}
