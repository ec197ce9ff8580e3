use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Change the current working directory.
#[derive(Parser)]
pub(crate) struct CdCommand {
    /// Directory to change to; defaults to `HOME`, and `-` means the previous directory.
    target_dir: Option<String>,
}

impl BuiltinCommand for CdCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        let mut should_print = false;
        let target = match self.target_dir.as_deref() {
            Some("-") => {
                should_print = true;
                match context.env_var("OLDPWD") {
                    Some(oldpwd) => oldpwd,
                    None => {
                        context.report_error("OLDPWD not set");
                        return Ok(ExecutionResult::general_error());
                    }
                }
            }
            Some(dir) => dir.to_owned(),
            None => match context.env_var("HOME") {
                Some(home) => home,
                None => {
                    context.report_error("HOME not set");
                    return Ok(ExecutionResult::general_error());
                }
            },
        };

        let path = context.resolve_path(&target);
        let metadata = context.shell.fs().stat(&path).await?;
        if !metadata.is_dir() {
            return Err(error::Error::NotADirectory(target));
        }

        tracing::debug!(target: crate::trace_categories::COMMANDS, "cd to {path}");
        context.shell.set_working_dir(&path);

        if should_print {
            context.stdout.push_str(&path);
            context.stdout.push('\n');
        }

        Ok(ExecutionResult::success())
    }
}
