use std::fmt::Write as _;

use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::{env, error};
use crate::results::ExecutionResult;

/// Set variables, or display them.
#[derive(Parser)]
pub(crate) struct ExportCommand {
    /// Variables to set, as `NAME=VALUE`; a bare `NAME` is accepted and left unchanged.
    #[arg(allow_hyphen_values = true)]
    names: Vec<String>,
}

impl BuiltinCommand for ExportCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        if self.names.is_empty() {
            for (name, value) in sorted_variables(context) {
                writeln!(context.stdout, "export {name}={value}")?;
            }
            return Ok(ExecutionResult::success());
        }

        let mut result = ExecutionResult::success();
        for entry in &self.names {
            if let Some((name, value)) = env::parse_assignment(entry) {
                context.shell.set_env_var(name, value);
            } else if !lash_parser::is_valid_name(entry) {
                context.report_error(format!("`{entry}': not a valid identifier"));
                result = ExecutionResult::general_error();
            }
        }

        Ok(result)
    }
}

/// Returns the named (non-special) variables, sorted by name.
pub(super) fn sorted_variables(context: &ExecutionContext<'_>) -> Vec<(String, String)> {
    let mut vars: Vec<_> = context
        .shell
        .env_snapshot()
        .into_iter()
        .filter(|(name, _)| lash_parser::is_valid_name(name))
        .collect();
    vars.sort();
    vars
}
