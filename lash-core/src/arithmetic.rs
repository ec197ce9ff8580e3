//! Arithmetic evaluation

use lash_parser::ast;

use crate::error::EvalError;
use crate::interp::ExecutionParameters;
use crate::{Shell, expansion, trace_categories};

/// Maximum depth of variables whose values are themselves expressions.
const MAX_REFERENCE_DEPTH: usize = 64;

/// Evaluate the given arithmetic expression text, returning the resulting numeric value.
///
/// The text is first expanded (parameters, command substitutions, nested arithmetic) and
/// only then parsed.
///
/// # Arguments
///
/// * `shell` - The shell to use for evaluation.
/// * `params` - Execution parameters for any command substitutions.
/// * `expr` - The unexpanded arithmetic expression to evaluate.
pub(crate) async fn expand_and_eval(
    shell: &Shell,
    params: &ExecutionParameters,
    expr: &str,
) -> Result<i64, crate::Error> {
    let expanded = expansion::expand_unquoted_str(shell, params, expr).await?;

    let parsed = lash_parser::arithmetic::parse(&expanded)
        .map_err(|e| EvalError::ParseError(e, expanded.trim().to_owned()))?;

    let value = parsed.eval(shell)?;
    tracing::debug!(target: trace_categories::ARITHMETIC, "(( {parsed} )) => {value}");
    Ok(value)
}

/// Trait implemented by evaluatable arithmetic expressions.
pub trait Evaluatable {
    /// Evaluate the given arithmetic expression, returning the resulting numeric value.
    ///
    /// # Arguments
    ///
    /// * `shell` - The shell whose variables are read and assigned.
    fn eval(&self, shell: &Shell) -> Result<i64, EvalError>;
}

impl Evaluatable for ast::ArithmeticExpr {
    fn eval(&self, shell: &Shell) -> Result<i64, EvalError> {
        eval_expr(self, shell, 0)
    }
}

fn eval_expr(expr: &ast::ArithmeticExpr, shell: &Shell, depth: usize) -> Result<i64, EvalError> {
    let value = match expr {
        ast::ArithmeticExpr::Literal(l) => *l,
        ast::ArithmeticExpr::Reference(name) => deref_variable(shell, name, depth)?,
        ast::ArithmeticExpr::UnaryOp(op, operand) => {
            apply_unary_op(*op, eval_expr(operand, shell, depth)?)
        }
        ast::ArithmeticExpr::BinaryOp(op, left, right) => {
            apply_binary_op(shell, *op, left, right, depth)?
        }
        ast::ArithmeticExpr::Conditional(condition, then_expr, else_expr) => {
            // Only the branch selected by the condition is evaluated.
            if eval_expr(condition, shell, depth)? != 0 {
                eval_expr(then_expr, shell, depth)?
            } else {
                eval_expr(else_expr, shell, depth)?
            }
        }
        ast::ArithmeticExpr::Assignment(name, value) => {
            let value = eval_expr(value, shell, depth)?;
            assign(shell, name, value)
        }
        ast::ArithmeticExpr::UnaryAssignment(op, name) => {
            apply_unary_assignment_op(shell, name, *op, depth)?
        }
        ast::ArithmeticExpr::BinaryAssignment(op, name, operand) => {
            let reference = ast::ArithmeticExpr::Reference(name.clone());
            let value = apply_binary_op(shell, *op, &reference, operand, depth)?;
            assign(shell, name, value)
        }
    };

    Ok(value)
}

fn deref_variable(shell: &Shell, name: &str, depth: usize) -> Result<i64, EvalError> {
    let value = shell.env_var(name).unwrap_or_default();
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n);
    }
    if depth >= MAX_REFERENCE_DEPTH {
        return Err(EvalError::RecursionLimitExceeded(name.to_owned()));
    }

    let parsed = lash_parser::arithmetic::parse(trimmed)
        .map_err(|_| EvalError::InvalidOperand(trimmed.to_owned()))?;
    eval_expr(&parsed, shell, depth + 1)
}

const fn apply_unary_op(op: ast::UnaryOperator, operand: i64) -> i64 {
    match op {
        ast::UnaryOperator::UnaryPlus => operand,
        ast::UnaryOperator::UnaryMinus => operand.wrapping_neg(),
        ast::UnaryOperator::BitwiseNot => !operand,
        ast::UnaryOperator::LogicalNot => bool_to_i64(operand == 0),
    }
}

fn apply_binary_op(
    shell: &Shell,
    op: ast::BinaryOperator,
    left: &ast::ArithmeticExpr,
    right: &ast::ArithmeticExpr,
    depth: usize,
) -> Result<i64, EvalError> {
    // Short-circuiting operators must not eagerly evaluate their right operand.
    match op {
        ast::BinaryOperator::LogicalAnd => {
            if eval_expr(left, shell, depth)? == 0 {
                return Ok(0);
            }
            return Ok(bool_to_i64(eval_expr(right, shell, depth)? != 0));
        }
        ast::BinaryOperator::LogicalOr => {
            if eval_expr(left, shell, depth)? != 0 {
                return Ok(1);
            }
            return Ok(bool_to_i64(eval_expr(right, shell, depth)? != 0));
        }
        _ => (),
    }

    let left = eval_expr(left, shell, depth)?;
    let right = eval_expr(right, shell, depth)?;

    let value = match op {
        ast::BinaryOperator::Power => {
            let exponent = u64::try_from(right).map_err(|_| EvalError::NegativeExponent)?;
            wrapping_pow_u64(left, exponent)
        }
        ast::BinaryOperator::Multiply => left.wrapping_mul(right),
        ast::BinaryOperator::Divide => {
            if right == 0 {
                return Err(EvalError::DivideByZero);
            }
            left.wrapping_div(right)
        }
        ast::BinaryOperator::Modulo => {
            if right == 0 {
                return Err(EvalError::DivideByZero);
            }
            // The result takes the sign of the dividend.
            left.wrapping_rem(right)
        }
        ast::BinaryOperator::Comma => right,
        ast::BinaryOperator::Add => left.wrapping_add(right),
        ast::BinaryOperator::Subtract => left.wrapping_sub(right),
        ast::BinaryOperator::ShiftLeft => left.wrapping_shl(shift_amount(right)),
        ast::BinaryOperator::ShiftRight => left.wrapping_shr(shift_amount(right)),
        ast::BinaryOperator::LessThan => bool_to_i64(left < right),
        ast::BinaryOperator::LessThanOrEqualTo => bool_to_i64(left <= right),
        ast::BinaryOperator::GreaterThan => bool_to_i64(left > right),
        ast::BinaryOperator::GreaterThanOrEqualTo => bool_to_i64(left >= right),
        ast::BinaryOperator::Equals => bool_to_i64(left == right),
        ast::BinaryOperator::NotEquals => bool_to_i64(left != right),
        ast::BinaryOperator::BitwiseAnd => left & right,
        ast::BinaryOperator::BitwiseXor => left ^ right,
        ast::BinaryOperator::BitwiseOr => left | right,
        ast::BinaryOperator::LogicalAnd | ast::BinaryOperator::LogicalOr => 0,
    };

    Ok(value)
}

fn apply_unary_assignment_op(
    shell: &Shell,
    name: &str,
    op: ast::UnaryAssignmentOperator,
    depth: usize,
) -> Result<i64, EvalError> {
    let value = deref_variable(shell, name, depth)?;
    let result = match op {
        ast::UnaryAssignmentOperator::PrefixIncrement => assign(shell, name, value.wrapping_add(1)),
        ast::UnaryAssignmentOperator::PrefixDecrement => assign(shell, name, value.wrapping_sub(1)),
        ast::UnaryAssignmentOperator::PostfixIncrement => {
            assign(shell, name, value.wrapping_add(1));
            value
        }
        ast::UnaryAssignmentOperator::PostfixDecrement => {
            assign(shell, name, value.wrapping_sub(1));
            value
        }
    };

    Ok(result)
}

fn assign(shell: &Shell, name: &str, value: i64) -> i64 {
    shell.set_env_var(name, value.to_string());
    value
}

fn shift_amount(value: i64) -> u32 {
    u32::try_from(value & 63).unwrap_or_default()
}

const fn bool_to_i64(value: bool) -> i64 {
    if value { 1 } else { 0 }
}

// N.B. Our own version of wrapping_pow that takes a 64-bit exponent, so that overflow with
// large exponents is handled the same way as small ones.
const fn wrapping_pow_u64(mut base: i64, mut exponent: u64) -> i64 {
    let mut result: i64 = 1;
    while exponent > 0 {
        if exponent % 2 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exponent /= 2;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreateOptions;
    use crate::fs::MemoryFs;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn shell() -> Shell {
        Shell::new(Arc::new(MemoryFs::new()), CreateOptions::default())
    }

    fn eval(shell: &Shell, text: &str) -> Result<i64> {
        Ok(lash_parser::arithmetic::parse(text)?.eval(shell)?)
    }

    #[test]
    fn operators() -> Result<()> {
        let shell = shell();
        assert_eq!(eval(&shell, "2 + 3 * 4")?, 14);
        assert_eq!(eval(&shell, "2 ** 3 ** 2")?, 512);
        assert_eq!(eval(&shell, "7 / 2")?, 3);
        assert_eq!(eval(&shell, "-3 % 2")?, -1);
        assert_eq!(eval(&shell, "1 << 4 | 1")?, 17);
        assert_eq!(eval(&shell, "5 > 3 && 0 || 2")?, 1);
        assert_eq!(eval(&shell, "0 ? 10 : 20")?, 20);
        assert_eq!(eval(&shell, "!0 + ~0")?, 0);
        Ok(())
    }

    #[test]
    fn errors() {
        let shell = shell();
        assert!(matches!(
            lash_parser::arithmetic::parse("1 / 0").map(|e| e.eval(&shell)),
            Ok(Err(EvalError::DivideByZero))
        ));
        assert!(matches!(
            lash_parser::arithmetic::parse("5 % 0").map(|e| e.eval(&shell)),
            Ok(Err(EvalError::DivideByZero))
        ));
        assert!(matches!(
            lash_parser::arithmetic::parse("2 ** -1").map(|e| e.eval(&shell)),
            Ok(Err(EvalError::NegativeExponent))
        ));
    }

    #[test]
    fn variables_and_assignment() -> Result<()> {
        let shell = shell();
        shell.set_env_var("x", "5");
        shell.set_env_var("expr", "x * 2");

        assert_eq!(eval(&shell, "x + 1")?, 6);
        assert_eq!(eval(&shell, "expr + 1")?, 11);
        assert_eq!(eval(&shell, "unset_var + 1")?, 1);

        assert_eq!(eval(&shell, "x++")?, 5);
        assert_eq!(shell.env_var("x").as_deref(), Some("6"));
        assert_eq!(eval(&shell, "--x")?, 5);
        assert_eq!(eval(&shell, "y = (x += 10)")?, 15);
        assert_eq!(shell.env_var("y").as_deref(), Some("15"));
        Ok(())
    }

    #[test]
    fn self_reference_is_bounded() {
        let shell = shell();
        shell.set_env_var("loop", "loop + 1");
        assert!(matches!(
            lash_parser::arithmetic::parse("loop").map(|e| e.eval(&shell)),
            Ok(Err(EvalError::RecursionLimitExceeded(_)))
        ));
    }
}
