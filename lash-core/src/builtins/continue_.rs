use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::{ExecutionControlFlow, ExecutionExitCode, ExecutionResult};

/// Continues to the next iteration of a control-flow loop.
#[derive(Parser)]
pub(crate) struct ContinueCommand {
    /// If specified, indicates which nested loop to continue to the next iteration of.
    #[clap(default_value_t = 1)]
    which_loop: i64,
}

impl BuiltinCommand for ContinueCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        if self.which_loop < 1 {
            context.report_error(format!("{}: loop count out of range", self.which_loop));
            return Ok(ExecutionExitCode::InvalidUsage.into());
        }

        Ok(ExecutionResult {
            next_control_flow: ExecutionControlFlow::ContinueLoop {
                levels: usize::try_from(self.which_loop - 1).unwrap_or_default(),
            },
            ..ExecutionResult::success()
        })
    }
}
