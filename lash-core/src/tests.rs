//! Evaluation of `test` and `[` expressions.

use async_recursion::async_recursion;
use lash_parser::ast::{BinaryPredicate, TestExpr, UnaryPredicate};

use crate::fs::{FileKind, Metadata};
use crate::{Shell, error};

/// Evaluates a `test` or `[` command line.
///
/// # Arguments
///
/// * `shell` - The shell whose filesystem and working directory are used.
/// * `name` - `test` or `[`; the latter requires a closing `]`.
/// * `args` - The expanded arguments.
pub(crate) async fn run_test_command(
    shell: &Shell,
    name: &str,
    args: &[String],
) -> Result<bool, error::Error> {
    let args = if name == "[" {
        match args.split_last() {
            Some((last, rest)) if last == "]" => rest,
            _ => return Err(error::Error::InvalidArguments("missing `]'".into())),
        }
    } else {
        args
    };

    eval_test_args(shell, args).await
}

/// Parses and evaluates the arguments of a `test` command.
///
/// # Arguments
///
/// * `shell` - The shell whose filesystem and working directory are used.
/// * `args` - The expanded arguments, without the closing `]` of the bracket form.
pub(crate) async fn eval_test_args(shell: &Shell, args: &[String]) -> Result<bool, error::Error> {
    let expr = lash_parser::test_command::parse(args)?;
    eval_test_expr(&expr, shell).await
}

#[async_recursion]
pub(crate) async fn eval_test_expr(expr: &TestExpr, shell: &Shell) -> Result<bool, error::Error> {
    match expr {
        TestExpr::False => Ok(false),
        TestExpr::Literal(s) => Ok(!s.is_empty()),
        TestExpr::And(left, right) => {
            Ok(eval_test_expr(left, shell).await? && eval_test_expr(right, shell).await?)
        }
        TestExpr::Or(left, right) => {
            Ok(eval_test_expr(left, shell).await? || eval_test_expr(right, shell).await?)
        }
        TestExpr::Not(expr) => Ok(!eval_test_expr(expr, shell).await?),
        TestExpr::Parenthesized(expr) => eval_test_expr(expr, shell).await,
        TestExpr::UnaryTest(op, operand) => apply_unary_predicate(*op, operand, shell).await,
        TestExpr::BinaryTest(op, left, right) => apply_binary_predicate(*op, left, right),
    }
}

async fn apply_unary_predicate(
    op: UnaryPredicate,
    operand: &str,
    shell: &Shell,
) -> Result<bool, error::Error> {
    match op {
        UnaryPredicate::StringHasZeroLength => return Ok(operand.is_empty()),
        UnaryPredicate::StringHasNonZeroLength => return Ok(!operand.is_empty()),
        _ => (),
    }

    let Some(metadata) = stat(shell, operand).await else {
        return Ok(false);
    };

    Ok(match op {
        UnaryPredicate::FileExists | UnaryPredicate::FileExistsAndIsReadable => true,
        UnaryPredicate::FileExistsAndIsRegularFile => metadata.kind == FileKind::File,
        UnaryPredicate::FileExistsAndIsDir => metadata.kind == FileKind::Directory,
        UnaryPredicate::FileExistsAndIsWritable => !metadata.readonly,
        UnaryPredicate::FileExistsAndIsExecutable => metadata.executable,
        UnaryPredicate::FileExistsAndIsNotZeroLength => metadata.len > 0,
        UnaryPredicate::StringHasZeroLength | UnaryPredicate::StringHasNonZeroLength => false,
    })
}

async fn stat(shell: &Shell, path: &str) -> Option<Metadata> {
    if path.is_empty() {
        return None;
    }
    shell.fs().stat(&shell.resolve_path(path)).await.ok()
}

fn apply_binary_predicate(
    op: BinaryPredicate,
    left: &str,
    right: &str,
) -> Result<bool, error::Error> {
    match op {
        BinaryPredicate::StringsAreEqual => Ok(left == right),
        BinaryPredicate::StringsAreNotEqual => Ok(left != right),
        BinaryPredicate::LeftSortsBeforeRight => Ok(left < right),
        BinaryPredicate::LeftSortsAfterRight => Ok(left > right),
        BinaryPredicate::ArithmeticEqualTo => Ok(parse_int(left)? == parse_int(right)?),
        BinaryPredicate::ArithmeticNotEqualTo => Ok(parse_int(left)? != parse_int(right)?),
        BinaryPredicate::ArithmeticLessThan => Ok(parse_int(left)? < parse_int(right)?),
        BinaryPredicate::ArithmeticLessThanOrEqualTo => Ok(parse_int(left)? <= parse_int(right)?),
        BinaryPredicate::ArithmeticGreaterThan => Ok(parse_int(left)? > parse_int(right)?),
        BinaryPredicate::ArithmeticGreaterThanOrEqualTo => {
            Ok(parse_int(left)? >= parse_int(right)?)
        }
    }
}

fn parse_int(s: &str) -> Result<i64, error::Error> {
    s.trim()
        .parse()
        .map_err(|_| error::Error::InvalidArguments(format!("{s}: integer expression expected")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreateOptions;
    use crate::fs::{Filesystem, MemoryFs};
    use anyhow::Result;
    use std::sync::Arc;

    async fn eval(shell: &Shell, args: &[&str]) -> Result<bool> {
        let args: Vec<String> = args.iter().map(|s| (*s).to_owned()).collect();
        Ok(eval_test_args(shell, &args).await?)
    }

    #[tokio::test]
    async fn string_and_integer_predicates() -> Result<()> {
        let shell = Shell::new(Arc::new(MemoryFs::new()), CreateOptions::default());

        assert!(eval(&shell, &["-z", ""]).await?);
        assert!(eval(&shell, &["-n", "x"]).await?);
        assert!(eval(&shell, &["a", "==", "a"]).await?);
        assert!(eval(&shell, &["a", "!=", "b"]).await?);
        assert!(eval(&shell, &["10", "-gt", "9"]).await?);
        assert!(!eval(&shell, &["!", "x"]).await?);
        assert!(!eval(&shell, &[]).await?);
        assert!(eval(&shell, &["x"]).await?);
        assert!(eval(&shell, &["-n", "x", "-a", "1", "-le", "1"]).await?);

        let result = eval(&shell, &["a", "-eq", "1"]).await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn file_predicates() -> Result<()> {
        let fs = Arc::new(MemoryFs::new());
        fs.mkdir("/work", false).await?;
        fs.write("/work/empty", b"").await?;
        fs.write("/work/script", b"#!/bin/sh\necho hi\n").await?;
        let shell = Shell::new(
            fs,
            CreateOptions::builder().working_dir("/work").build(),
        );

        assert!(eval(&shell, &["-e", "empty"]).await?);
        assert!(eval(&shell, &["-f", "/work/empty"]).await?);
        assert!(!eval(&shell, &["-s", "empty"]).await?);
        assert!(eval(&shell, &["-s", "script"]).await?);
        assert!(eval(&shell, &["-x", "script"]).await?);
        assert!(!eval(&shell, &["-x", "empty"]).await?);
        assert!(eval(&shell, &["-d", "."]).await?);
        assert!(eval(&shell, &["-w", "empty"]).await?);
        assert!(!eval(&shell, &["-e", "missing"]).await?);
        Ok(())
    }
}
