use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::{ExecutionControlFlow, ExecutionResult};

/// Evaluate the provided script in the current shell environment.
#[derive(Parser)]
pub(crate) struct DotCommand {
    /// Path to the script to evaluate.
    script_path: String,

    /// Any arguments to be passed as positional parameters to the script.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    script_args: Vec<String>,
}

impl BuiltinCommand for DotCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        let path = context.resolve_path(&self.script_path);
        let text = context.shell.fs().read_to_string(&path).await?;

        // Without arguments, the script sees the caller's positional parameters.
        let saved = (!self.script_args.is_empty()).then(|| {
            context.shell.write_env(|env| {
                let name = env.get("0").unwrap_or_default().to_owned();
                env.bind_positional_parameters(&name, &self.script_args)
            })
        });

        let result = context.run_nested(&text).await;

        if let Some(saved) = saved {
            context
                .shell
                .write_env(|env| env.restore_positional_parameters(saved));
        }

        let mut result = result?;
        if matches!(
            result.next_control_flow,
            ExecutionControlFlow::ReturnFromFunctionOrScript
        ) {
            result.next_control_flow = ExecutionControlFlow::Normal;
        }
        Ok(result)
    }
}
