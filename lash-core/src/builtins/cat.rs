use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Concatenate files to standard output.
#[derive(Parser)]
pub(crate) struct CatCommand {
    /// Files to print; `-` or no files reads standard input.
    files: Vec<String>,
}

impl BuiltinCommand for CatCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        if self.files.is_empty() {
            let stdin = std::mem::take(&mut context.stdin);
            context.stdout.push_str(&stdin);
            return Ok(ExecutionResult::success());
        }

        let mut result = ExecutionResult::success();
        for file in &self.files {
            if file == "-" {
                let stdin = std::mem::take(&mut context.stdin);
                context.stdout.push_str(&stdin);
                continue;
            }

            let path = context.resolve_path(file);
            match context.shell.fs().read(&path).await {
                Ok(bytes) => context.stdout.push_str(&String::from_utf8_lossy(&bytes)),
                Err(e) => {
                    context.report_error(e);
                    result = ExecutionResult::general_error();
                }
            }
        }

        Ok(result)
    }
}
