use crate::fs::FsError;
use crate::results::ExecutionExitCode;

/// Monolithic error type for the interpreter.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A command or function could not be resolved.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// A command was resolved but cannot be executed.
    #[error("{0}: cannot execute")]
    NotExecutable(String),

    /// A script names an interpreter that is not available.
    #[error("{script}: bad interpreter: {interpreter}")]
    UnknownInterpreter {
        /// Path of the script.
        script: String,
        /// The interpreter named by the script's shebang line.
        interpreter: String,
    },

    /// A function recursed more deeply than allowed.
    #[error("{0}: maximum function nesting level exceeded")]
    MaxFunctionCallDepthExceeded(String),

    /// A loop exceeded the configured iteration cap.
    #[error("loop exceeded {0} iterations")]
    LoopIterationLimitExceeded(usize),

    /// A `${...}` expression could not be interpreted.
    #[error("{0}: bad substitution")]
    BadSubstitution(String),

    /// A shell pattern could not be compiled.
    #[error("invalid pattern: '{0}'")]
    InvalidPattern(String),

    /// A command received invalid arguments.
    #[error("{0}")]
    InvalidArguments(String),

    /// The working directory could not be changed.
    #[error("{0}: not a directory")]
    NotADirectory(String),

    /// A filesystem operation failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// An arithmetic expression could not be evaluated.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// A control construct was malformed.
    #[error(transparent)]
    Parse(#[from] lash_parser::ParseError),

    /// A command line could not be tokenized.
    #[error(transparent)]
    Tokenizer(#[from] lash_parser::TokenizerError),

    /// A `test` expression could not be parsed.
    #[error(transparent)]
    TestCommandParse(#[from] lash_parser::TestCommandParseError),

    /// A command plugin panicked while executing.
    #[error("{0}: command panicked")]
    CommandPanicked(String),

    /// A background job panicked while executing.
    #[error("[{0}] job panicked")]
    JobPanicked(usize),

    /// A background task could not be joined.
    #[error("failed to join background task: {0}")]
    Threading(#[from] tokio::task::JoinError),

    /// An I/O error occurred.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be formatted.
    #[error("formatting error: {0}")]
    Formatting(#[from] std::fmt::Error),
}

impl Error {
    /// Returns the exit code a command failing with this error reports.
    pub const fn exit_code(&self) -> ExecutionExitCode {
        match self {
            Self::CommandNotFound(_) => ExecutionExitCode::NotFound,
            Self::NotExecutable(_) | Self::UnknownInterpreter { .. } => {
                ExecutionExitCode::CannotExecute
            }
            Self::Tokenizer(_)
            | Self::Parse(lash_parser::ParseError::Tokenizing(_))
            | Self::TestCommandParse(_)
            | Self::InvalidArguments(_) => ExecutionExitCode::InvalidUsage,
            Self::CommandPanicked(_) | Self::JobPanicked(_) => ExecutionExitCode::Fatal,
            _ => ExecutionExitCode::GeneralError,
        }
    }
}

/// Errors that can occur while evaluating an arithmetic expression.
#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    /// Division by zero.
    #[error("division by 0")]
    DivideByZero,

    /// A negative exponent.
    #[error("exponent less than 0")]
    NegativeExponent,

    /// The expression text could not be parsed.
    #[error("{1}: syntax error in expression")]
    ParseError(#[source] lash_parser::WordParseError, String),

    /// A variable held a value that is not a valid expression.
    #[error("{0}: invalid arithmetic operand")]
    InvalidOperand(String),

    /// A variable referenced itself too many times while being evaluated.
    #[error("{0}: expression recursion level exceeded")]
    RecursionLimitExceeded(String),
}
