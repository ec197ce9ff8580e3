//! Parser for `test` and `[` expressions.

use crate::ast::{BinaryPredicate, TestExpr, UnaryPredicate};
use crate::error::TestCommandParseError;

/// Parses the arguments of a `test` command (without the closing `]` of the bracket form).
///
/// # Arguments
///
/// * `input` - The expanded arguments.
pub fn parse<S: AsRef<str>>(input: &[S]) -> Result<TestExpr, TestCommandParseError> {
    let input: Vec<&str> = input.iter().map(AsRef::as_ref).collect();

    test_command::full_expression(input.as_slice()).map_err(TestCommandParseError::TestCommand)
}

fn literal(s: &str) -> Box<TestExpr> {
    Box::new(TestExpr::Literal(s.to_owned()))
}

peg::parser! {
    grammar test_command<'a>() for [&'a str] {
        pub(crate) rule full_expression() -> TestExpr =
            end() { TestExpr::False } /
            e:one_arg_expr() end() { e } /
            e:two_arg_expr() end() { e } /
            e:three_arg_expr() end() { e } /
            e:four_arg_expr() end() { e } /
            expression()

        rule one_arg_expr() -> TestExpr =
            [s] { TestExpr::Literal(s.to_owned()) }

        rule two_arg_expr() -> TestExpr =
            ["!"] e:one_arg_expr() { TestExpr::Not(Box::new(e)) } /
            op:unary_op() [s] { TestExpr::UnaryTest(op, s.to_owned()) }

        rule three_arg_expr() -> TestExpr =
            [left] op:binary_op() [right] { TestExpr::BinaryTest(op, left.to_owned(), right.to_owned()) } /
            [left] ["-a"] [right] { TestExpr::And(literal(left), literal(right)) } /
            [left] ["-o"] [right] { TestExpr::Or(literal(left), literal(right)) } /
            ["!"] e:two_arg_expr() { TestExpr::Not(Box::new(e)) } /
            ["("] e:one_arg_expr() [")"] { e }

        rule four_arg_expr() -> TestExpr =
            ["!"] e:three_arg_expr() { TestExpr::Not(Box::new(e)) }

        rule expression() -> TestExpr = precedence! {
            left:(@) ["-o"] right:@ { TestExpr::Or(Box::new(left), Box::new(right)) }
            --
            left:(@) ["-a"] right:@ { TestExpr::And(Box::new(left), Box::new(right)) }
            --
            ["!"] e:@ { TestExpr::Not(Box::new(e)) }
            --
            ["("] e:expression() [")"] { TestExpr::Parenthesized(Box::new(e)) }
            [left] op:binary_op() [right] { TestExpr::BinaryTest(op, left.to_owned(), right.to_owned()) }
            op:unary_op() [operand] { TestExpr::UnaryTest(op, operand.to_owned()) }
            [s] { TestExpr::Literal(s.to_owned()) }
        }

        rule unary_op() -> UnaryPredicate =
            ["-z"] { UnaryPredicate::StringHasZeroLength } /
            ["-n"] { UnaryPredicate::StringHasNonZeroLength } /
            ["-e"] { UnaryPredicate::FileExists } /
            ["-f"] { UnaryPredicate::FileExistsAndIsRegularFile } /
            ["-d"] { UnaryPredicate::FileExistsAndIsDir } /
            ["-r"] { UnaryPredicate::FileExistsAndIsReadable } /
            ["-w"] { UnaryPredicate::FileExistsAndIsWritable } /
            ["-x"] { UnaryPredicate::FileExistsAndIsExecutable } /
            ["-s"] { UnaryPredicate::FileExistsAndIsNotZeroLength }

        rule binary_op() -> BinaryPredicate =
            ["=" | "=="] { BinaryPredicate::StringsAreEqual } /
            ["!="] { BinaryPredicate::StringsAreNotEqual } /
            ["<"] { BinaryPredicate::LeftSortsBeforeRight } /
            [">"] { BinaryPredicate::LeftSortsAfterRight } /
            ["-eq"] { BinaryPredicate::ArithmeticEqualTo } /
            ["-ne"] { BinaryPredicate::ArithmeticNotEqualTo } /
            ["-lt"] { BinaryPredicate::ArithmeticLessThan } /
            ["-le"] { BinaryPredicate::ArithmeticLessThanOrEqualTo } /
            ["-gt"] { BinaryPredicate::ArithmeticGreaterThan } /
            ["-ge"] { BinaryPredicate::ArithmeticGreaterThanOrEqualTo }

        rule end() = ![_]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_arity_forms() -> Result<()> {
        assert_eq!(parse::<&str>(&[])?, TestExpr::False);
        assert_eq!(parse(&["x"])?, TestExpr::Literal("x".into()));
        assert_eq!(
            parse(&["-z", ""])?,
            TestExpr::UnaryTest(UnaryPredicate::StringHasZeroLength, String::new())
        );
        assert_eq!(
            parse(&["a", "=", "b"])?,
            TestExpr::BinaryTest(BinaryPredicate::StringsAreEqual, "a".into(), "b".into())
        );
        assert_eq!(
            parse(&["!", "-d", "/tmp"])?,
            TestExpr::Not(Box::new(TestExpr::UnaryTest(
                UnaryPredicate::FileExistsAndIsDir,
                "/tmp".into()
            )))
        );
        Ok(())
    }

    #[test]
    fn operators_as_operands() -> Result<()> {
        // A lone operator-looking string is just a non-empty literal.
        assert_eq!(parse(&["-z"])?, TestExpr::Literal("-z".into()));
        assert_eq!(
            parse(&["-n", "="])?,
            TestExpr::UnaryTest(UnaryPredicate::StringHasNonZeroLength, "=".into())
        );
        Ok(())
    }

    #[test]
    fn conjunctions() -> Result<()> {
        assert_eq!(
            parse(&["-n", "a", "-a", "1", "-lt", "2"])?,
            TestExpr::And(
                Box::new(TestExpr::UnaryTest(
                    UnaryPredicate::StringHasNonZeroLength,
                    "a".into()
                )),
                Box::new(TestExpr::BinaryTest(
                    BinaryPredicate::ArithmeticLessThan,
                    "1".into(),
                    "2".into()
                ))
            )
        );
        Ok(())
    }

    #[test]
    fn unparseable() {
        assert!(parse(&["-z", "a", "b", "c", "d"]).is_err());
    }
}
