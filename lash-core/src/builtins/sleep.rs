use std::time::Duration;

use clap::Parser;

use crate::builtins::BuiltinCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Suspend execution for a period of time.
#[derive(Parser)]
pub(crate) struct SleepCommand {
    /// Durations to sleep for, summed; each is a number of seconds with an optional `s`, `m`,
    /// `h` or `d` suffix.
    #[arg(required = true)]
    durations: Vec<String>,
}

impl BuiltinCommand for SleepCommand {
    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        let mut total = Duration::ZERO;
        for duration in &self.durations {
            match parse_duration(duration) {
                Some(d) => total += d,
                None => {
                    context.report_error(format!("invalid time interval '{duration}'"));
                    return Ok(ExecutionResult::general_error());
                }
            }
        }

        tokio::time::sleep(total).await;
        Ok(ExecutionResult::success())
    }
}

fn parse_duration(s: &str) -> Option<Duration> {
    let (number, multiplier) = match s.char_indices().last()? {
        (i, 's') => (&s[..i], 1.0),
        (i, 'm') => (&s[..i], 60.0),
        (i, 'h') => (&s[..i], 3600.0),
        (i, 'd') => (&s[..i], 86400.0),
        _ => (s, 1.0),
    };

    let seconds: f64 = number.parse().ok()?;
    Duration::try_from_secs_f64(seconds * multiplier).ok()
}
