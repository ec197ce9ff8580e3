//! Running script files.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::commands::{Command, ExecutionContext};
use crate::error::Error;
use crate::fs::{self, FsError};
use crate::interp::{self, ExecutionParameters};
use crate::results::{ExecutionControlFlow, ExecutionResult};
use crate::{Shell, trace_categories};

/// Interpreter names that mean "this shell".
const SHELL_INTERPRETERS: &[&str] = &["sh", "bash", "lash"];

/// Command plugins tried, in order, for scripts without a shebang line, by file extension.
const EXTENSION_INTERPRETERS: &[(&str, &[&str])] = &[
    ("py", &["python3", "python"]),
    ("js", &["node"]),
    ("mjs", &["node"]),
];

enum Interpreter {
    Shell,
    Command(Arc<dyn Command>),
}

/// Runs a file found by command resolution.
///
/// # Arguments
///
/// * `shell` - The shell to run in.
/// * `path` - Absolute path of the file.
/// * `name` - The name the file was invoked by.
/// * `args` - Arguments to the script.
/// * `params` - Execution parameters; standard input is taken from here.
pub(crate) async fn execute_file(
    shell: &Shell,
    path: &str,
    name: &str,
    args: &[String],
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    if shell.fs().stat(path).await?.is_dir() {
        return Err(Error::NotExecutable(name.to_owned()));
    }

    let text = match shell.fs().read_to_string(path).await {
        Ok(text) => text,
        Err(FsError::InvalidData(_)) => return Err(Error::NotExecutable(name.to_owned())),
        Err(e) => return Err(e.into()),
    };

    match select_interpreter(shell, path, &text)? {
        Interpreter::Shell => run_script_text(shell, &text, name, args, params).await,
        Interpreter::Command(command) => {
            tracing::debug!(target: trace_categories::COMMANDS, "running {path} with {}", command.name());
            let mut command_args = vec![path.to_owned()];
            command_args.extend_from_slice(args);
            run_with_interpreter(shell, command.as_ref(), command_args, params).await
        }
    }
}

/// Runs a script file as shell text, regardless of any shebang line.
///
/// # Arguments
///
/// * `shell` - The shell to run in.
/// * `path` - Absolute path of the script.
/// * `name` - Value for `$0`.
/// * `args` - Values for the positional parameters.
/// * `params` - Execution parameters.
pub(crate) async fn run_script_file(
    shell: &Shell,
    path: &str,
    name: &str,
    args: &[String],
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let text = shell.fs().read_to_string(path).await?;
    run_script_text(shell, &text, name, args, params).await
}

/// Runs shell text as a script: positional parameters are bound for its duration, and
/// `return` or `exit` ends only the script.
async fn run_script_text(
    shell: &Shell,
    text: &str,
    name: &str,
    args: &[String],
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let saved = shell.write_env(|env| env.bind_positional_parameters(name, args));
    let result = interp::execute_text(shell, text, params).await;
    shell.write_env(|env| env.restore_positional_parameters(saved));

    let mut result = result?;
    if result.is_return_or_exit() {
        result.next_control_flow = ExecutionControlFlow::Normal;
    }
    Ok(result)
}

/// Runs a script through an interpreter plugin. A panic in the plugin fails the script the
/// same way a panicking command fails its segment.
async fn run_with_interpreter(
    shell: &Shell,
    command: &dyn Command,
    args: Vec<String>,
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let mut context = ExecutionContext::new(
        shell,
        params,
        command.name().to_owned(),
        args,
        params.take_stdin(),
    );

    let outcome = AssertUnwindSafe(command.execute(&mut context))
        .catch_unwind()
        .await;
    params.stdout.write_str(&context.stdout)?;
    params.stderr.write_str(&context.stderr)?;

    outcome.unwrap_or_else(|_| {
        let error = Error::CommandPanicked(context.command_name.clone());
        tracing::error!(target: trace_categories::COMMANDS, "{error}");
        Err(error)
    })
}

fn select_interpreter(shell: &Shell, path: &str, text: &str) -> Result<Interpreter, Error> {
    if let Some(interpreter) = shebang_interpreter(text) {
        if interpreter == shell.shell_name() || SHELL_INTERPRETERS.contains(&interpreter) {
            return Ok(Interpreter::Shell);
        }

        return shell
            .command(interpreter)
            .map(Interpreter::Command)
            .ok_or_else(|| Error::UnknownInterpreter {
                script: path.to_owned(),
                interpreter: interpreter.to_owned(),
            });
    }

    let extension = fs::file_name(path).rsplit_once('.').map(|(_, ext)| ext);
    let candidates = EXTENSION_INTERPRETERS
        .iter()
        .find(|(ext, _)| Some(*ext) == extension)
        .map_or(&[][..], |(_, candidates)| *candidates);

    Ok(candidates
        .iter()
        .find_map(|name| shell.command(name))
        .map_or(Interpreter::Shell, Interpreter::Command))
}

/// Returns the program named by a `#!` line, looking through `env`.
fn shebang_interpreter(text: &str) -> Option<&str> {
    let line = text.lines().next()?.strip_prefix("#!")?;
    let mut parts = line.split_whitespace();
    let mut program = fs::file_name(parts.next()?);

    if program == "env" {
        program = parts.find(|part| !part.starts_with('-'))?;
    }

    Some(fs::file_name(program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shebangs() {
        assert_eq!(shebang_interpreter("#!/bin/sh\necho"), Some("sh"));
        assert_eq!(shebang_interpreter("#!/usr/bin/env -S python3 -u\n"), Some("python3"));
        assert_eq!(shebang_interpreter("#! /usr/local/bin/node"), Some("node"));
        assert_eq!(shebang_interpreter("echo hi\n"), None);
        assert_eq!(shebang_interpreter(""), None);
    }
}
