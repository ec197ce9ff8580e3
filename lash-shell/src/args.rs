use std::path::PathBuf;

use clap::Parser;

use crate::events;

const SHORT_DESCRIPTION: &str = "Line-oriented shell";

const LONG_DESCRIPTION: &str = r"
lash runs shell-like command text against a pluggable set of commands and a host-backed or
in-memory filesystem. Commands are read from -c, from a script file, or from standard input.
";

/// Parsed command-line arguments for the lash shell.
#[derive(Parser, Debug)]
#[clap(name = "lash",
       version,
       about = SHORT_DESCRIPTION,
       long_about = LONG_DESCRIPTION)]
#[allow(clippy::module_name_repetitions)]
pub struct CommandLineArgs {
    /// Execute the provided command and then exit.
    #[arg(short = 'c', value_name = "COMMAND")]
    pub command: Option<String>,

    /// Path to a configuration file; defaults to the platform configuration directory.
    #[clap(long = "config", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Do not load any configuration file.
    #[clap(long = "no-config", conflicts_with = "config_file")]
    pub no_config: bool,

    /// Host directory exposed to the shell as `/`.
    #[clap(long = "root", value_name = "DIR", conflicts_with = "in_memory")]
    pub root: Option<PathBuf>,

    /// Run against an empty in-memory filesystem instead of the host's.
    #[clap(long = "in-memory")]
    pub in_memory: bool,

    /// Iterations after which a loop is stopped as runaway.
    #[clap(long = "max-loop-iterations", value_name = "N")]
    pub max_loop_iterations: Option<usize>,

    /// Maximum nesting of function calls.
    #[clap(long = "max-function-call-depth", value_name = "N")]
    pub max_function_call_depth: Option<usize>,

    /// Directory searched for executables before `PATH`; may be repeated.
    #[clap(long = "local-bin-dir", value_name = "DIR")]
    pub local_bin_dirs: Vec<String>,

    /// Enable debug logging for classes of tracing events.
    #[clap(long = "log-enable", alias = "debug", value_name = "EVENT")]
    pub enabled_log_events: Vec<events::TraceEvent>,

    /// Path to script to execute.
    #[clap(allow_hyphen_values = true)]
    pub script_path: Option<String>,

    /// Arguments for script.
    // `allow_hyphen_values`: do not strip `-` from flags
    // `num_args=1..`: consume everything
    #[clap(allow_hyphen_values = true, num_args = 1..)]
    pub script_args: Vec<String>,
}
