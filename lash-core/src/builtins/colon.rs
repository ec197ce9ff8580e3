use crate::builtins::SimpleCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// No-op command.
pub(crate) struct ColonCommand;

impl SimpleCommand for ColonCommand {
    fn description() -> &'static str {
        "Null command; always succeeds."
    }

    async fn execute(_context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, error::Error> {
        Ok(ExecutionResult::success())
    }
}
