//! Parser for `$(( ... ))` arithmetic expressions.

use crate::ast::{ArithmeticExpr, BinaryOperator, UnaryAssignmentOperator, UnaryOperator};
use crate::error::WordParseError;

/// Parses an arithmetic expression. The empty string parses as `0`.
///
/// # Arguments
///
/// * `input` - The expression text, already variable-expanded.
pub fn parse(input: &str) -> Result<ArithmeticExpr, WordParseError> {
    tracing::debug!(target: "arithmetic", "parsing arithmetic expression: '{input}'");

    arithmetic::full_expression(input).map_err(WordParseError::ArithmeticExpression)
}

fn binary(op: BinaryOperator, left: ArithmeticExpr, right: ArithmeticExpr) -> ArithmeticExpr {
    ArithmeticExpr::BinaryOp(op, Box::new(left), Box::new(right))
}

fn unary(op: UnaryOperator, operand: ArithmeticExpr) -> ArithmeticExpr {
    ArithmeticExpr::UnaryOp(op, Box::new(operand))
}

fn compound(op: BinaryOperator, name: &str, value: ArithmeticExpr) -> ArithmeticExpr {
    ArithmeticExpr::BinaryAssignment(op, name.to_owned(), Box::new(value))
}

peg::parser! {
    grammar arithmetic() for str {
        pub(crate) rule full_expression() -> ArithmeticExpr =
            _ ![_] { ArithmeticExpr::Literal(0) } /
            _ e:expression() _ { e }

        rule expression() -> ArithmeticExpr = precedence!{
            x:(@) _ "," _ y:@ { binary(BinaryOperator::Comma, x, y) }
            --
            n:name() _ "*=" _ y:(@) { compound(BinaryOperator::Multiply, n, y) }
            n:name() _ "/=" _ y:(@) { compound(BinaryOperator::Divide, n, y) }
            n:name() _ "%=" _ y:(@) { compound(BinaryOperator::Modulo, n, y) }
            n:name() _ "+=" _ y:(@) { compound(BinaryOperator::Add, n, y) }
            n:name() _ "-=" _ y:(@) { compound(BinaryOperator::Subtract, n, y) }
            n:name() _ "<<=" _ y:(@) { compound(BinaryOperator::ShiftLeft, n, y) }
            n:name() _ ">>=" _ y:(@) { compound(BinaryOperator::ShiftRight, n, y) }
            n:name() _ "&=" _ y:(@) { compound(BinaryOperator::BitwiseAnd, n, y) }
            n:name() _ "|=" _ y:(@) { compound(BinaryOperator::BitwiseOr, n, y) }
            n:name() _ "^=" _ y:(@) { compound(BinaryOperator::BitwiseXor, n, y) }
            --
            n:name() _ "=" !"=" _ y:(@) { ArithmeticExpr::Assignment(n.to_owned(), Box::new(y)) }
            --
            x:@ _ "?" _ y:expression() _ ":" _ z:(@) {
                ArithmeticExpr::Conditional(Box::new(x), Box::new(y), Box::new(z))
            }
            --
            x:(@) _ "||" _ y:@ { binary(BinaryOperator::LogicalOr, x, y) }
            --
            x:(@) _ "&&" _ y:@ { binary(BinaryOperator::LogicalAnd, x, y) }
            --
            x:(@) _ "|" !"|" _ y:@ { binary(BinaryOperator::BitwiseOr, x, y) }
            --
            x:(@) _ "^" _ y:@ { binary(BinaryOperator::BitwiseXor, x, y) }
            --
            x:(@) _ "&" !"&" _ y:@ { binary(BinaryOperator::BitwiseAnd, x, y) }
            --
            x:(@) _ "==" _ y:@ { binary(BinaryOperator::Equals, x, y) }
            x:(@) _ "!=" _ y:@ { binary(BinaryOperator::NotEquals, x, y) }
            --
            x:(@) _ "<=" _ y:@ { binary(BinaryOperator::LessThanOrEqualTo, x, y) }
            x:(@) _ ">=" _ y:@ { binary(BinaryOperator::GreaterThanOrEqualTo, x, y) }
            x:(@) _ "<" !"<" _ y:@ { binary(BinaryOperator::LessThan, x, y) }
            x:(@) _ ">" !">" _ y:@ { binary(BinaryOperator::GreaterThan, x, y) }
            --
            x:(@) _ "<<" _ y:@ { binary(BinaryOperator::ShiftLeft, x, y) }
            x:(@) _ ">>" _ y:@ { binary(BinaryOperator::ShiftRight, x, y) }
            --
            x:(@) _ "+" !"+" _ y:@ { binary(BinaryOperator::Add, x, y) }
            x:(@) _ "-" !"-" _ y:@ { binary(BinaryOperator::Subtract, x, y) }
            --
            x:(@) _ "*" !"*" _ y:@ { binary(BinaryOperator::Multiply, x, y) }
            x:(@) _ "/" _ y:@ { binary(BinaryOperator::Divide, x, y) }
            x:(@) _ "%" _ y:@ { binary(BinaryOperator::Modulo, x, y) }
            --
            // Right-associative: 2 ** 3 ** 2 == 2 ** 9
            x:@ _ "**" _ y:(@) { binary(BinaryOperator::Power, x, y) }
            --
            "!" _ x:(@) { unary(UnaryOperator::LogicalNot, x) }
            "~" _ x:(@) { unary(UnaryOperator::BitwiseNot, x) }
            --
            "++" _ n:name() { ArithmeticExpr::UnaryAssignment(UnaryAssignmentOperator::PrefixIncrement, n.to_owned()) }
            "--" _ n:name() { ArithmeticExpr::UnaryAssignment(UnaryAssignmentOperator::PrefixDecrement, n.to_owned()) }
            --
            n:name() _ "++" { ArithmeticExpr::UnaryAssignment(UnaryAssignmentOperator::PostfixIncrement, n.to_owned()) }
            n:name() _ "--" { ArithmeticExpr::UnaryAssignment(UnaryAssignmentOperator::PostfixDecrement, n.to_owned()) }
            --
            "+" _ x:(@) { unary(UnaryOperator::UnaryPlus, x) }
            "-" _ x:(@) { unary(UnaryOperator::UnaryMinus, x) }
            --
            n:literal_number() { ArithmeticExpr::Literal(n) }
            n:name() { ArithmeticExpr::Reference(n.to_owned()) }
            "(" _ e:expression() _ ")" { e }
        }

        rule name() -> &'input str =
            $(['a'..='z' | 'A'..='Z' | '_'] ['a'..='z' | 'A'..='Z' | '_' | '0'..='9']*)

        rule _() = quiet!{[' ' | '\t' | '\n' | '\r']*}

        rule literal_number() -> i64 =
            "0" ['x' | 'X'] s:$(['0'..='9' | 'a'..='f' | 'A'..='F']+) {? i64::from_str_radix(s, 16).or(Err("i64")) } /
            "0" s:$(['0'..='7']+) {? i64::from_str_radix(s, 8).or(Err("i64")) } /
            s:$(['0'..='9']+) {? s.parse().or(Err("i64")) }
    }
}
