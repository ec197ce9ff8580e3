use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Unset a variable or function.
#[derive(Parser)]
pub(crate) struct UnsetCommand {
    /// Treat each name as a function.
    #[arg(short = 'f')]
    functions: bool,

    /// Treat each name as a variable.
    #[arg(short = 'v')]
    variables: bool,

    /// Names to unset.
    names: Vec<String>,
}

impl BuiltinCommand for UnsetCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        for name in &self.names {
            if self.functions {
                context.shell.undefine_function(name);
                continue;
            }

            // Without -v, a name that is not a variable falls back to a function.
            if context.shell.unset_env_var(name).is_none() && !self.variables {
                context.shell.undefine_function(name);
            }
        }

        Ok(ExecutionResult::success())
    }
}
