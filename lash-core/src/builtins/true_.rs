use crate::builtins::SimpleCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Returns 0.
pub(crate) struct TrueCommand;

impl SimpleCommand for TrueCommand {
    fn description() -> &'static str {
        "Return success."
    }

    async fn execute(_context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, error::Error> {
        Ok(ExecutionResult::success())
    }
}
