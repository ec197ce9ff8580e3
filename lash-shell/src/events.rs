use std::collections::HashSet;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Type of event to trace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum TraceEvent {
    /// Traces parsing and evaluation of arithmetic expressions.
    #[clap(name = "arithmetic")]
    Arithmetic,
    /// Traces command resolution and execution.
    #[clap(name = "commands")]
    Commands,
    /// Traces word expansion.
    #[clap(name = "expand")]
    Expand,
    /// Traces function calls.
    #[clap(name = "functions")]
    Functions,
    /// Traces background jobs.
    #[clap(name = "jobs")]
    Jobs,
    /// Traces parsing of statements and control constructs.
    #[clap(name = "parse")]
    Parse,
    /// Traces pattern matching.
    #[clap(name = "pattern")]
    Pattern,
    /// Traces the process of tokenizing input text.
    #[clap(name = "tokenize")]
    Tokenize,
}

impl TraceEvent {
    /// Returns the tracing target the event class is logged under.
    const fn target(self) -> &'static str {
        match self {
            Self::Arithmetic => "arithmetic",
            Self::Commands => "commands",
            Self::Expand => "expansion",
            Self::Functions => "functions",
            Self::Jobs => "jobs",
            Self::Parse => "parse",
            Self::Pattern => "pattern",
            Self::Tokenize => "tokenize",
        }
    }
}

/// Installs a stderr subscriber that logs at `INFO` by default and at `DEBUG` for the given
/// event classes.
///
/// # Arguments
///
/// * `enabled_log_events` - The event classes to enable debug logging for.
pub(crate) fn init(enabled_log_events: &[TraceEvent]) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(compose_filter(enabled_log_events));

    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        // Something went wrong; proceed on anyway but complain audibly.
        eprintln!("warning: failed to initialize tracing.");
    }
}

fn compose_filter(enabled_log_events: &[TraceEvent]) -> Targets {
    let events: HashSet<TraceEvent> = enabled_log_events.iter().copied().collect();

    Targets::new()
        .with_default(LevelFilter::INFO)
        .with_targets(
            events
                .into_iter()
                .map(|event| (event.target(), tracing::Level::DEBUG)),
        )
}
