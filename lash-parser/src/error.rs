/// Represents an error that occurred while tokenizing a command.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    /// A single-quoted string was never closed.
    #[error("unterminated single quote")]
    UnterminatedSingleQuote,

    /// A double-quoted string was never closed.
    #[error("unterminated double quote")]
    UnterminatedDoubleQuote,

    /// A backquoted command substitution was never closed.
    #[error("unterminated backquote")]
    UnterminatedBackquote,

    /// A `$(` or `${` was never closed.
    #[error("unterminated substitution")]
    UnterminatedSubstitution,

    /// A redirection operator was not followed by a target.
    #[error("syntax error: missing target for '{0}'")]
    MissingRedirectTarget(String),
}

/// Represents an error that occurred while parsing statements.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input ended while a construct was still open.
    #[error("syntax error: unexpected end of input (unterminated '{0}')")]
    Unterminated(&'static str),

    /// A keyword appeared where it cannot be used.
    #[error("syntax error near unexpected token '{0}'")]
    UnexpectedKeyword(String),

    /// A construct was missing a required keyword.
    #[error("syntax error: expected '{expected}' in '{construct}'")]
    MissingKeyword {
        /// The keyword that was expected.
        expected: &'static str,
        /// The construct being parsed.
        construct: &'static str,
    },

    /// A `for` loop named an invalid variable.
    #[error("'{0}': not a valid identifier")]
    InvalidIdentifier(String),

    /// An error occurred while tokenizing part of a construct.
    #[error(transparent)]
    Tokenizing(#[from] TokenizerError),
}

/// Represents an error that occurred while parsing an expression embedded in a word.
#[derive(Debug, thiserror::Error)]
pub enum WordParseError {
    /// An error occurred while parsing an arithmetic expression.
    #[error("failed to parse arithmetic expression")]
    ArithmeticExpression(peg::error::ParseError<peg::str::LineCol>),
}

/// Represents an error that occurred while parsing a `test` expression.
#[derive(Debug, thiserror::Error)]
pub enum TestCommandParseError {
    /// An error occurred while parsing a test command.
    #[error("failed to parse test command")]
    TestCommand(peg::error::ParseError<usize>),
}
