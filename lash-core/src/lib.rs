//! Core implementation of the lash shell. Implements the interpreter state, the expansion
//! pipeline, control flow, functions and background jobs, and the dispatcher that hands
//! pipeline segments to builtins, functions, command plugins or scripts.

mod arithmetic;
pub mod builtins;
mod commands;
pub mod env;
mod error;
mod expansion;
pub mod fs;
pub mod functions;
pub mod history;
mod interp;
mod jobs;
mod pathsearch;
mod patterns;
mod results;
mod scripts;
mod shell;
mod sinks;
mod tests;
mod trace_categories;

pub use builtins::{BuiltinCommand, SimpleCommand, builtin, simple_builtin};
pub use commands::{Command, ExecutionContext};
pub use error::{Error, EvalError};
pub use interp::ExecutionParameters;
pub use jobs::{JobInfo, JobState};
pub use results::{ExecutionControlFlow, ExecutionExitCode, ExecutionResult};
pub use shell::{CreateOptions, DEFAULT_PATH, RuntimeOptions, Shell};
pub use sinks::{OutputSink, SharedBuffer};
