//! Defines the syntax types produced by the lash parser.
//!
//! Unlike a full shell AST, statements keep the raw text of their simple commands; expansion
//! happens at execution time against that text, so only the structure of control constructs
//! is captured here.

use std::fmt::{Display, Write};

/// A single character of a tokenized word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordChar {
    /// A character to be taken literally.
    Literal(char),
    /// An unquoted glob metacharacter (`*`, `?`, `[`, or the `]` closing a bracket
    /// expression).
    Glob(char),
}

impl WordChar {
    /// Returns the underlying character.
    pub const fn as_char(self) -> char {
        match self {
            Self::Literal(c) | Self::Glob(c) => c,
        }
    }
}

/// A tokenized word. Quotes have been removed; glob metacharacters that were unquoted are
/// tagged as [`WordChar::Glob`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Word(pub Vec<WordChar>);

impl Word {
    /// Returns whether the word contains any active glob metacharacter. A `]` only closes a
    /// bracket expression, so it does not count on its own.
    pub fn has_glob(&self) -> bool {
        self.0
            .iter()
            .any(|c| matches!(c, WordChar::Glob('*' | '?' | '[')))
    }

    /// Returns whether the word is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the word's characters.
    pub fn chars(&self) -> &[WordChar] {
        &self.0
    }
}

impl From<&str> for Word {
    fn from(s: &str) -> Self {
        Self(s.chars().map(WordChar::Literal).collect())
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.0 {
            f.write_char(c.as_char())?;
        }
        Ok(())
    }
}

/// The kind of an I/O redirection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectKind {
    /// `>` or `>|`
    StdoutTruncate,
    /// `>>`
    StdoutAppend,
    /// `<`
    StdinRead,
    /// `2>`
    StderrTruncate,
    /// `2>>`
    StderrAppend,
    /// `2>&1`
    StderrToStdout,
    /// `>&2`
    StdoutToStderr,
    /// `<<TAG` or `<<-TAG`; the target is the tag.
    HereDocument,
}

impl RedirectKind {
    /// Returns whether this kind of redirection consumes a target word.
    pub const fn takes_target(self) -> bool {
        !matches!(self, Self::StderrToStdout | Self::StdoutToStderr)
    }
}

impl Display for RedirectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StdoutTruncate => write!(f, ">"),
            Self::StdoutAppend => write!(f, ">>"),
            Self::StdinRead => write!(f, "<"),
            Self::StderrTruncate => write!(f, "2>"),
            Self::StderrAppend => write!(f, "2>>"),
            Self::StderrToStdout => write!(f, "2>&1"),
            Self::StdoutToStderr => write!(f, ">&2"),
            Self::HereDocument => write!(f, "<<"),
        }
    }
}

/// An I/O redirection attached to a pipeline segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// The kind of redirection.
    pub kind: RedirectKind,
    /// The target path (or heredoc tag); absent for descriptor duplication.
    pub target: Option<Word>,
}

/// One `|`-delimited command: its words and its redirections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineSegment {
    /// Command name and arguments, in order.
    pub words: Vec<Word>,
    /// Redirections, in source order.
    pub redirects: Vec<Redirect>,
}

/// Describes how the previous compound command's exit code gates the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompoundOperator {
    /// First command in its sequence; always runs.
    #[default]
    None,
    /// Runs only if the previous command succeeded (`&&`).
    And,
    /// Runs only if the previous command failed (`||`).
    Or,
    /// Always runs (`;`).
    Sequence,
}

impl CompoundOperator {
    /// Returns whether a command with this operator should run, given the previous exit code.
    ///
    /// # Arguments
    ///
    /// * `last_exit_code` - Exit code of the preceding command.
    pub const fn should_run(self, last_exit_code: u8) -> bool {
        match self {
            Self::None | Self::Sequence => true,
            Self::And => last_exit_code == 0,
            Self::Or => last_exit_code != 0,
        }
    }
}

impl Display for CompoundOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::Sequence => write!(f, ";"),
        }
    }
}

/// A `;`/`&&`/`||`-delimited unit of a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundCommand {
    /// How the preceding compound's exit code gates this one.
    pub operator: CompoundOperator,
    /// The raw, unexpanded text of the compound.
    pub text: String,
}

/// A parsed statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    /// How the preceding statement's exit code gates this one.
    pub connector: CompoundOperator,
    /// The command to run.
    pub command: Command,
}

/// The kinds of statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A line of compound commands, kept as raw text.
    Simple(String),
    /// A line to run as a background job (the trailing `&` removed).
    Background(String),
    /// A function definition.
    Function(FunctionDefinition),
    /// An `if` construct.
    If(IfCommand),
    /// A `while` or `until` loop.
    While(WhileCommand),
    /// A `for` loop.
    For(ForCommand),
    /// A `case` construct.
    Case(CaseCommand),
}

/// A function definition; the body is kept unparsed until invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDefinition {
    /// Function name.
    pub name: String,
    /// Raw body text, without the enclosing braces.
    pub body: String,
}

/// One `if`/`elif` arm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionalBranch {
    /// Raw condition text.
    pub condition: String,
    /// Statements to run when the condition holds.
    pub body: Vec<Statement>,
}

/// An `if` construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IfCommand {
    /// The `if` arm followed by any `elif` arms.
    pub branches: Vec<ConditionalBranch>,
    /// The `else` body, if any.
    pub else_body: Option<Vec<Statement>>,
}

/// A `while` or `until` loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhileCommand {
    /// True for `until`, which loops while the condition fails.
    pub until: bool,
    /// Raw condition text.
    pub condition: String,
    /// Loop body.
    pub body: Vec<Statement>,
}

/// A `for` loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForCommand {
    /// Loop variable name.
    pub variable: String,
    /// Raw text of the value list; `None` iterates the positional parameters.
    pub values: Option<String>,
    /// Loop body.
    pub body: Vec<Statement>,
}

/// A `case` construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseCommand {
    /// Raw text of the word being matched.
    pub word: String,
    /// Clauses, in order.
    pub items: Vec<CaseItem>,
}

/// One clause of a `case` construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseItem {
    /// Raw pattern text, alternatives separated by `|`.
    pub patterns: String,
    /// Statements run when a pattern matches.
    pub body: Vec<Statement>,
}

/// An arithmetic expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArithmeticExpr {
    /// A literal integer value.
    Literal(i64),
    /// A reference to a variable.
    Reference(String),
    /// A unary operation.
    UnaryOp(UnaryOperator, Box<ArithmeticExpr>),
    /// A binary operation.
    BinaryOp(BinaryOperator, Box<ArithmeticExpr>, Box<ArithmeticExpr>),
    /// A ternary conditional expression.
    Conditional(
        Box<ArithmeticExpr>,
        Box<ArithmeticExpr>,
        Box<ArithmeticExpr>,
    ),
    /// An assignment.
    Assignment(String, Box<ArithmeticExpr>),
    /// A compound assignment such as `x += 2`.
    BinaryAssignment(BinaryOperator, String, Box<ArithmeticExpr>),
    /// An increment or decrement.
    UnaryAssignment(UnaryAssignmentOperator, String),
}

impl Display for ArithmeticExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Reference(name) => write!(f, "{name}"),
            Self::UnaryOp(op, operand) => write!(f, "{op}{operand}"),
            Self::BinaryOp(BinaryOperator::Comma, left, right) => write!(f, "{left}, {right}"),
            Self::BinaryOp(op, left, right) => write!(f, "{left} {op} {right}"),
            Self::Conditional(condition, then, otherwise) => {
                write!(f, "{condition} ? {then} : {otherwise}")
            }
            Self::Assignment(name, value) => write!(f, "{name} = {value}"),
            Self::BinaryAssignment(op, name, value) => write!(f, "{name} {op}= {value}"),
            Self::UnaryAssignment(op, name) => match op {
                UnaryAssignmentOperator::PrefixIncrement => write!(f, "++{name}"),
                UnaryAssignmentOperator::PrefixDecrement => write!(f, "--{name}"),
                UnaryAssignmentOperator::PostfixIncrement => write!(f, "{name}++"),
                UnaryAssignmentOperator::PostfixDecrement => write!(f, "{name}--"),
            },
        }
    }
}

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `**`
    Power,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `,`
    Comma,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqualTo,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqualTo,
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `&`
    BitwiseAnd,
    /// `^`
    BitwiseXor,
    /// `|`
    BitwiseOr,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Power => "**",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Comma => ",",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::LessThan => "<",
            Self::LessThanOrEqualTo => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqualTo => ">=",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::BitwiseAnd => "&",
            Self::BitwiseXor => "^",
            Self::BitwiseOr => "|",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
        };
        f.write_str(s)
    }
}

/// A unary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `+x`
    UnaryPlus,
    /// `-x`
    UnaryMinus,
    /// `~x`
    BitwiseNot,
    /// `!x`
    LogicalNot,
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnaryPlus => write!(f, "+"),
            Self::UnaryMinus => write!(f, "-"),
            Self::BitwiseNot => write!(f, "~"),
            Self::LogicalNot => write!(f, "!"),
        }
    }
}

/// An increment or decrement operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryAssignmentOperator {
    /// `++x`
    PrefixIncrement,
    /// `--x`
    PrefixDecrement,
    /// `x++`
    PostfixIncrement,
    /// `x--`
    PostfixDecrement,
}

/// A `test`/`[` expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestExpr {
    /// Always false.
    False,
    /// A lone string; true when non-empty.
    Literal(String),
    /// `-a`
    And(Box<TestExpr>, Box<TestExpr>),
    /// `-o`
    Or(Box<TestExpr>, Box<TestExpr>),
    /// `!`
    Not(Box<TestExpr>),
    /// `( ... )`
    Parenthesized(Box<TestExpr>),
    /// A unary predicate applied to an operand.
    UnaryTest(UnaryPredicate, String),
    /// A binary predicate applied to two operands.
    BinaryTest(BinaryPredicate, String, String),
}

impl Display for TestExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::False => Ok(()),
            Self::Literal(s) => write!(f, "{s}"),
            Self::And(left, right) => write!(f, "{left} -a {right}"),
            Self::Or(left, right) => write!(f, "{left} -o {right}"),
            Self::Not(expr) => write!(f, "! {expr}"),
            Self::Parenthesized(expr) => write!(f, "( {expr} )"),
            Self::UnaryTest(pred, operand) => write!(f, "{pred} {operand}"),
            Self::BinaryTest(pred, left, right) => write!(f, "{left} {pred} {right}"),
        }
    }
}

/// A unary test predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryPredicate {
    /// `-z`
    StringHasZeroLength,
    /// `-n`
    StringHasNonZeroLength,
    /// `-e`
    FileExists,
    /// `-f`
    FileExistsAndIsRegularFile,
    /// `-d`
    FileExistsAndIsDir,
    /// `-r`
    FileExistsAndIsReadable,
    /// `-w`
    FileExistsAndIsWritable,
    /// `-x`
    FileExistsAndIsExecutable,
    /// `-s`
    FileExistsAndIsNotZeroLength,
}

impl Display for UnaryPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::StringHasZeroLength => "-z",
            Self::StringHasNonZeroLength => "-n",
            Self::FileExists => "-e",
            Self::FileExistsAndIsRegularFile => "-f",
            Self::FileExistsAndIsDir => "-d",
            Self::FileExistsAndIsReadable => "-r",
            Self::FileExistsAndIsWritable => "-w",
            Self::FileExistsAndIsExecutable => "-x",
            Self::FileExistsAndIsNotZeroLength => "-s",
        };
        f.write_str(s)
    }
}

/// A binary test predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryPredicate {
    /// `=` or `==`
    StringsAreEqual,
    /// `!=`
    StringsAreNotEqual,
    /// `<`
    LeftSortsBeforeRight,
    /// `>`
    LeftSortsAfterRight,
    /// `-eq`
    ArithmeticEqualTo,
    /// `-ne`
    ArithmeticNotEqualTo,
    /// `-lt`
    ArithmeticLessThan,
    /// `-le`
    ArithmeticLessThanOrEqualTo,
    /// `-gt`
    ArithmeticGreaterThan,
    /// `-ge`
    ArithmeticGreaterThanOrEqualTo,
}

impl Display for BinaryPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::StringsAreEqual => "==",
            Self::StringsAreNotEqual => "!=",
            Self::LeftSortsBeforeRight => "<",
            Self::LeftSortsAfterRight => ">",
            Self::ArithmeticEqualTo => "-eq",
            Self::ArithmeticNotEqualTo => "-ne",
            Self::ArithmeticLessThan => "-lt",
            Self::ArithmeticLessThanOrEqualTo => "-le",
            Self::ArithmeticGreaterThan => "-gt",
            Self::ArithmeticGreaterThanOrEqualTo => "-ge",
        };
        f.write_str(s)
    }
}
