use std::fmt::Write as _;

use crate::builtins::SimpleCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Accepts shell options without applying them. With no arguments, displays variables.
pub(crate) struct SetCommand;

impl SimpleCommand for SetCommand {
    fn description() -> &'static str {
        "Set shell options (accepted for compatibility; has no effect)."
    }

    async fn execute(context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, error::Error> {
        if context.args.is_empty() {
            for (name, value) in super::export::sorted_variables(context) {
                writeln!(context.stdout, "{name}={value}")?;
            }
        }
        Ok(ExecutionResult::success())
    }
}

/// Accepts shell behavior options without applying them.
pub(crate) struct ShoptCommand;

impl SimpleCommand for ShoptCommand {
    fn description() -> &'static str {
        "Set shell behavior options (accepted for compatibility; has no effect)."
    }

    async fn execute(_context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, error::Error> {
        Ok(ExecutionResult::success())
    }
}
