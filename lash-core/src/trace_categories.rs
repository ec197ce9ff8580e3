//! Trace utilities

/// Trace category for arithmetic evaluation.
pub const ARITHMETIC: &str = "arithmetic";
/// Trace category for command execution.
pub const COMMANDS: &str = "commands";
/// Trace category for word expansion.
pub const EXPANSION: &str = "expansion";
/// Trace category for function calls.
pub const FUNCTIONS: &str = "functions";
/// Trace category for background jobs.
pub const JOBS: &str = "jobs";
/// Trace category for parsing.
pub const PARSE: &str = "parse";
/// Trace category for shell patterns.
pub const PATTERN: &str = "pattern";
