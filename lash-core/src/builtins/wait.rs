use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::{ExecutionExitCode, ExecutionResult};

/// Wait for background jobs to complete.
#[derive(Parser)]
pub(crate) struct WaitCommand {
    /// Ids of the jobs to wait for, optionally written `%n`; waits for all jobs if none given.
    job_specs: Vec<String>,
}

impl BuiltinCommand for WaitCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        if self.job_specs.is_empty() {
            context.shell.wait_for_jobs().await?;
            return Ok(ExecutionResult::success());
        }

        let mut result = ExecutionResult::success();
        for spec in &self.job_specs {
            let id = spec.strip_prefix('%').unwrap_or(spec).parse::<usize>().ok();

            match id {
                Some(id) => match context.shell.wait_for_job(id).await? {
                    Some(job) => {
                        result = ExecutionResult::new(job.exit_code.unwrap_or(1));
                    }
                    None => {
                        context.report_error(format!("{spec}: no such job"));
                        result = ExecutionExitCode::NotFound.into();
                    }
                },
                None => {
                    context.report_error(format!("`{spec}': not a valid job id"));
                    result = ExecutionExitCode::InvalidUsage.into();
                }
            }
        }

        Ok(result)
    }
}
