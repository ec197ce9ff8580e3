use crate::builtins::SimpleCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Returns 1.
pub(crate) struct FalseCommand;

impl SimpleCommand for FalseCommand {
    fn description() -> &'static str {
        "Return failure."
    }

    async fn execute(_context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, error::Error> {
        Ok(ExecutionResult::general_error())
    }
}
