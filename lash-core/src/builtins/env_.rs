use std::fmt::Write as _;

use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Print the environment.
#[derive(Parser)]
pub(crate) struct EnvCommand {}

impl BuiltinCommand for EnvCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        for (name, value) in super::export::sorted_variables(context) {
            writeln!(context.stdout, "{name}={value}")?;
        }
        Ok(ExecutionResult::success())
    }
}
