use crate::builtins::SimpleCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Evaluate the given string as shell code.
pub(crate) struct EvalCommand;

impl SimpleCommand for EvalCommand {
    fn description() -> &'static str {
        "Execute arguments as a shell command."
    }

    async fn execute(context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, error::Error> {
        if context.args.is_empty() {
            return Ok(ExecutionResult::success());
        }

        let text = context.args.join(" ");
        tracing::debug!(target: crate::trace_categories::COMMANDS, "evaluating: {text}");
        context.run_nested(&text).await
    }
}
