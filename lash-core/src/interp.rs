//! The statement, compound and pipeline execution engine.
//!
//! Everything that runs text (functions, control-flow bodies, command substitutions,
//! background jobs, `eval` and `source`) comes back through [`execute_text`] with the same
//! [`Shell`] handle.

use std::fmt::Write as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use lash_parser::ast::{
    self, CaseCommand, ForCommand, IfCommand, PipelineSegment, Redirect, RedirectKind, Statement,
    WhileCommand,
};
use lash_parser::{HereDocuments, Parser};

use crate::commands::{Command, ExecutionContext};
use crate::env::{self, ShellEnvironment};
use crate::error::Error;
use crate::functions::Registration;
use crate::patterns::{self, Pattern};
use crate::results::{ExecutionControlFlow, ExecutionExitCode, ExecutionResult};
use crate::sinks::{OutputSink, SharedBuffer};
use crate::{Shell, expansion, jobs, pathsearch, scripts, tests as test_command, trace_categories};

/// Path that discards whatever is redirected to it.
const NULL_DEVICE: &str = "/dev/null";

/// Parameters for execution.
#[derive(Clone, Debug, Default)]
pub struct ExecutionParameters {
    /// Where standard output that leaves the interpreter goes.
    pub stdout: OutputSink,
    /// Where standard error that leaves the interpreter goes.
    pub stderr: OutputSink,
    /// Standard input for the first command that reads it; consumed on first use.
    pub stdin: Option<SharedBuffer>,
    pub(crate) here_documents: Arc<HereDocuments>,
    pub(crate) function_depth: usize,
}

impl ExecutionParameters {
    /// Returns parameters that send output to the given sinks, with no standard input.
    ///
    /// # Arguments
    ///
    /// * `stdout` - Where standard output goes.
    /// * `stderr` - Where standard error goes.
    pub fn new(stdout: OutputSink, stderr: OutputSink) -> Self {
        Self {
            stdout,
            stderr,
            ..Self::default()
        }
    }

    /// Returns parameters whose standard output and error are captured in memory.
    pub fn capturing() -> Self {
        Self::new(OutputSink::buffer(), OutputSink::buffer())
    }

    /// Returns the captured standard output; empty unless the sink is a buffer.
    pub fn stdout_text(&self) -> String {
        self.stdout.contents()
    }

    /// Returns the captured standard error; empty unless the sink is a buffer.
    pub fn stderr_text(&self) -> String {
        self.stderr.contents()
    }

    /// Returns a copy of these parameters with fresh capture buffers.
    pub(crate) fn capture(&self) -> Self {
        Self {
            stdout: OutputSink::buffer(),
            stderr: OutputSink::buffer(),
            ..self.clone()
        }
    }

    /// Returns a copy of these parameters with fresh capture buffers and the given input.
    pub(crate) fn capture_with_stdin(&self, stdin: String) -> Self {
        Self {
            stdin: Some(SharedBuffer::from(stdin)),
            ..self.capture()
        }
    }

    pub(crate) fn take_stdin(&self) -> String {
        self.stdin
            .as_ref()
            .map(SharedBuffer::take)
            .unwrap_or_default()
    }

    /// Returns parameters for running text extracted with the given here-documents. Text
    /// without here-documents keeps the caller's, since it may still reference them.
    fn with_here_documents(&self, docs: HereDocuments) -> Self {
        if docs.is_empty() {
            return self.clone();
        }

        Self {
            here_documents: Arc::new(docs),
            ..self.clone()
        }
    }
}

/// Writes an error to the caller's standard error, prefixed with the shell name.
pub(crate) fn report_error(shell: &Shell, params: &ExecutionParameters, error: &Error) {
    let message = format!("{}: {error}\n", shell.shell_name());
    if let Err(e) = params.stderr.write_str(&message) {
        tracing::error!("failed to write error: {e}");
    }
}

/// Executes a block of shell text, statement by statement.
///
/// Here-document bodies are extracted first. A syntax error stops the block; statements
/// before it have already run.
///
/// # Arguments
///
/// * `shell` - The shell to execute in.
/// * `text` - The text to execute.
/// * `params` - Execution parameters.
pub(crate) async fn execute_text(
    shell: &Shell,
    text: &str,
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let (source, docs) = lash_parser::extract_here_documents(text);
    let params = params.with_here_documents(docs);
    execute_source(shell, &source, &params).await
}

/// Executes text whose here-document bodies have already been extracted, such as a function
/// body or a background command; its operators refer to `params`' here-documents.
#[async_recursion::async_recursion]
pub(crate) async fn execute_source(
    shell: &Shell,
    source: &str,
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let mut result = ExecutionResult::success();
    for statement in Parser::new(source) {
        let statement = match statement {
            Ok(statement) => statement,
            Err(e) => {
                tracing::debug!(target: trace_categories::PARSE, "parse error: {e}");
                let error = Error::from(e);
                report_error(shell, params, &error);
                result = ExecutionResult::from(error.exit_code());
                shell.set_last_exit_code(result.code());
                break;
            }
        };

        if !statement.connector.should_run(shell.last_exit_code()) {
            continue;
        }

        result = execute_statement(shell, &statement, params).await;
        shell.set_last_exit_code(result.code());
        if !result.is_normal_flow() {
            break;
        }
    }

    Ok(result)
}

async fn execute_statements(
    shell: &Shell,
    statements: &[Statement],
    params: &ExecutionParameters,
) -> ExecutionResult {
    let mut result = ExecutionResult::success();

    for statement in statements {
        if !statement.connector.should_run(shell.last_exit_code()) {
            continue;
        }

        result = execute_statement(shell, statement, params).await;
        shell.set_last_exit_code(result.code());
        if !result.is_normal_flow() {
            break;
        }
    }

    result
}

/// Executes one statement; any error becomes a message on standard error and an exit code.
async fn execute_statement(
    shell: &Shell,
    statement: &Statement,
    params: &ExecutionParameters,
) -> ExecutionResult {
    match statement.execute(shell, params).await {
        Ok(result) => result,
        Err(e) => {
            report_error(shell, params, &e);
            ExecutionResult::from(e.exit_code())
        }
    }
}

/// Trait implemented by statements and constructs that can be executed.
#[async_trait::async_trait]
trait Execute {
    /// Executes the item.
    ///
    /// # Arguments
    ///
    /// * `shell` - The shell to execute in.
    /// * `params` - Execution parameters.
    async fn execute(
        &self,
        shell: &Shell,
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error>;
}

#[async_trait::async_trait]
impl Execute for Statement {
    async fn execute(
        &self,
        shell: &Shell,
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error> {
        match &self.command {
            ast::Command::Simple(line) => execute_line(shell, line, params).await,
            ast::Command::Background(line) => {
                let job = jobs::start(shell, line, params);
                params
                    .stdout
                    .write_str(&format!("[{}] {}\n", job.id, job.command))?;
                Ok(ExecutionResult::success())
            }
            ast::Command::Function(definition) => {
                shell.define_function(Registration {
                    definition: definition.clone(),
                    here_documents: params.here_documents.clone(),
                });
                Ok(ExecutionResult::success())
            }
            ast::Command::If(command) => command.execute(shell, params).await,
            ast::Command::While(command) => command.execute(shell, params).await,
            ast::Command::For(command) => command.execute(shell, params).await,
            ast::Command::Case(command) => command.execute(shell, params).await,
        }
    }
}

#[async_trait::async_trait]
impl Execute for IfCommand {
    async fn execute(
        &self,
        shell: &Shell,
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error> {
        for branch in &self.branches {
            let condition = execute_condition(shell, &branch.condition, params).await?;
            if !condition.is_normal_flow() {
                return Ok(condition);
            }
            if condition.is_success() {
                return Ok(execute_statements(shell, &branch.body, params).await);
            }
        }

        match &self.else_body {
            Some(body) => Ok(execute_statements(shell, body, params).await),
            None => Ok(ExecutionResult::success()),
        }
    }
}

#[async_trait::async_trait]
impl Execute for WhileCommand {
    async fn execute(
        &self,
        shell: &Shell,
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error> {
        let max_iterations = shell.options().max_loop_iterations;
        let mut result = ExecutionResult::success();
        let mut iterations = 0;

        loop {
            let condition = execute_condition(shell, &self.condition, params).await?;
            if !condition.is_normal_flow() {
                return Ok(condition);
            }
            if condition.is_success() == self.until {
                break;
            }

            if iterations == max_iterations {
                return Err(Error::LoopIterationLimitExceeded(max_iterations));
            }
            iterations += 1;

            result = execute_statements(shell, &self.body, params).await;
            if loop_action(&mut result) == LoopAction::Exit {
                break;
            }
        }

        Ok(result)
    }
}

#[async_trait::async_trait]
impl Execute for ForCommand {
    async fn execute(
        &self,
        shell: &Shell,
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error> {
        let values = match &self.values {
            Some(text) => expansion::expand_and_split(shell, params, text).await?,
            None => shell.read_env(ShellEnvironment::positional_parameters),
        };

        let max_iterations = shell.options().max_loop_iterations;
        let mut result = ExecutionResult::success();

        for (iteration, value) in values.into_iter().enumerate() {
            if iteration == max_iterations {
                return Err(Error::LoopIterationLimitExceeded(max_iterations));
            }

            shell.set_env_var(self.variable.as_str(), value);
            result = execute_statements(shell, &self.body, params).await;
            if loop_action(&mut result) == LoopAction::Exit {
                break;
            }
        }

        Ok(result)
    }
}

#[async_trait::async_trait]
impl Execute for CaseCommand {
    async fn execute(
        &self,
        shell: &Shell,
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error> {
        let word = expansion::expand_to_words(shell, params, &self.word)
            .await?
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");

        for item in &self.items {
            for alternative in lash_parser::split_pipeline(&item.patterns) {
                let pattern = expansion::expand_to_words(shell, params, &alternative)
                    .await?
                    .iter()
                    .map(patterns::escape_word)
                    .collect::<Vec<_>>()
                    .join(" ");

                if Pattern::new(&pattern)?.exactly_matches(&word) {
                    tracing::debug!(target: trace_categories::PATTERN, "case {word:?} matched {pattern:?}");
                    return Ok(execute_statements(shell, &item.body, params).await);
                }
            }
        }

        Ok(ExecutionResult::success())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LoopAction {
    Next,
    Exit,
}

/// Consumes the loop-related control flow of a body's result.
fn loop_action(result: &mut ExecutionResult) -> LoopAction {
    match result.next_control_flow {
        ExecutionControlFlow::Normal => LoopAction::Next,
        ExecutionControlFlow::ContinueLoop { levels: 0 } => {
            result.next_control_flow = ExecutionControlFlow::Normal;
            LoopAction::Next
        }
        ExecutionControlFlow::BreakLoop { .. } | ExecutionControlFlow::ContinueLoop { .. } => {
            result.next_control_flow = result.next_control_flow.try_decrement_loop_levels();
            LoopAction::Exit
        }
        ExecutionControlFlow::ReturnFromFunctionOrScript | ExecutionControlFlow::ExitShell => {
            LoopAction::Exit
        }
    }
}

/// Runs the condition of an `if`, `elif`, `while` or `until`.
///
/// A lone `[ ... ]` or `test ...` is evaluated directly rather than dispatched.
async fn execute_condition(
    shell: &Shell,
    condition: &str,
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    if !is_lone_test_command(condition) {
        return execute_source(shell, condition, params).await;
    }

    let argv = expansion::expand_and_split(shell, params, condition).await?;
    let result = match argv.split_first() {
        Some((name, args)) => match test_command::run_test_command(shell, name, args).await {
            Ok(true) => ExecutionResult::success(),
            Ok(false) => ExecutionResult::general_error(),
            Err(e) => {
                report_error(shell, params, &e);
                ExecutionResult::from(e.exit_code())
            }
        },
        None => ExecutionResult::success(),
    };

    shell.set_last_exit_code(result.code());
    Ok(result)
}

fn is_lone_test_command(condition: &str) -> bool {
    let condition = condition.trim();
    let first = condition.split_whitespace().next();
    matches!(first, Some("[" | "test"))
        && !condition.contains(['\n', '<', '>'])
        && lash_parser::split_compounds(condition).len() == 1
        && lash_parser::split_pipeline(condition).len() == 1
}

/// Executes a line of compound commands, gating each on the exit code of the one before.
///
/// # Arguments
///
/// * `shell` - The shell to execute in.
/// * `line` - The line, with no control constructs.
/// * `params` - Execution parameters.
pub(crate) async fn execute_line(
    shell: &Shell,
    line: &str,
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let mut result = ExecutionResult::new(shell.last_exit_code());

    for compound in lash_parser::split_compounds(line) {
        if !compound.operator.should_run(shell.last_exit_code()) {
            tracing::debug!(target: trace_categories::COMMANDS, "skipping: {} {}", compound.operator, compound.text);
            continue;
        }

        result = execute_compound(shell, &compound.text, params).await?;
        shell.set_last_exit_code(result.code());
        if !result.is_normal_flow() {
            break;
        }
    }

    Ok(result)
}

/// Expands a compound command and runs its pipeline, stage by stage.
async fn execute_compound(
    shell: &Shell,
    text: &str,
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let expanded = match expansion::expand_text(shell, params, text).await {
        Ok(expanded) => expanded,
        Err(e) => {
            report_error(shell, params, &e);
            return Ok(ExecutionResult::from(e.exit_code()));
        }
    };

    let segments = lash_parser::split_pipeline(&expanded);
    let last = segments.len().saturating_sub(1);
    let mut stdin = None;
    let mut result = ExecutionResult::success();

    for (i, segment) in segments.iter().enumerate() {
        let output = execute_segment(shell, segment, stdin.take(), params).await?;
        params.stderr.write_str(&output.stderr)?;
        result = output.result;

        if i == last {
            params.stdout.write_str(&output.stdout)?;
        } else {
            stdin = Some(output.stdout);
        }

        if output.halt_pipeline || !result.is_normal_flow() {
            break;
        }
    }

    Ok(result)
}

/// What one pipeline segment produced.
#[derive(Debug, Default)]
struct SegmentOutput {
    result: ExecutionResult,
    stdout: String,
    stderr: String,
    halt_pipeline: bool,
}

impl SegmentOutput {
    fn new(result: ExecutionResult) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }

    fn failure(shell: &Shell, error: &Error) -> Self {
        Self {
            result: ExecutionResult::from(error.exit_code()),
            stderr: format!("{}: {error}\n", shell.shell_name()),
            ..Self::default()
        }
    }

    fn from_captured(
        shell: &Shell,
        result: Result<ExecutionResult, Error>,
        params: &ExecutionParameters,
    ) -> Self {
        let mut stderr = params.stderr.contents();
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                let _ = writeln!(stderr, "{}: {e}", shell.shell_name());
                ExecutionResult::from(e.exit_code())
            }
        };

        Self {
            result,
            stdout: params.stdout.contents(),
            stderr,
            halt_pipeline: false,
        }
    }
}

async fn execute_segment(
    shell: &Shell,
    text: &str,
    piped_stdin: Option<String>,
    params: &ExecutionParameters,
) -> Result<SegmentOutput, Error> {
    let segment = match lash_parser::tokenize(text).and_then(lash_parser::parse_segment) {
        Ok(segment) => segment,
        Err(e) => return Ok(SegmentOutput::failure(shell, &Error::from(e))),
    };
    let PipelineSegment {
        mut words,
        redirects,
    } = segment;

    let assignment_count = words
        .iter()
        .take_while(|word| env::parse_assignment(&word.to_string()).is_some())
        .count();
    for word in words.drain(..assignment_count) {
        let word = word.to_string();
        if let Some((name, value)) = env::parse_assignment(&word) {
            shell.set_env_var(name, value);
        }
    }

    if words.is_empty() && redirects.is_empty() {
        // A bare assignment leaves the exit code as it was.
        return Ok(SegmentOutput::new(ExecutionResult::new(
            shell.last_exit_code(),
        )));
    }

    let argv = match expansion::expand_words(shell, &words).await {
        Ok(argv) => argv,
        Err(e) => return Ok(SegmentOutput::failure(shell, &e)),
    };

    let stdin = match read_stdin(shell, &redirects, piped_stdin, params).await {
        Ok(stdin) => stdin,
        Err(e) => return Ok(SegmentOutput::failure(shell, &e)),
    };

    let mut output = if argv.is_empty() {
        SegmentOutput::new(ExecutionResult::success())
    } else {
        dispatch(shell, argv, stdin, params).await
    };

    if let Err(e) = apply_output_redirects(shell, &redirects, &mut output).await {
        let _ = writeln!(output.stderr, "{}: {e}", shell.shell_name());
        output.result = ExecutionResult::general_error();
    }

    Ok(output)
}

/// Determines a segment's standard input: the last input redirection wins over piped input,
/// which wins over the caller's input.
async fn read_stdin(
    shell: &Shell,
    redirects: &[Redirect],
    piped_stdin: Option<String>,
    params: &ExecutionParameters,
) -> Result<String, Error> {
    let mut stdin = None;

    for redirect in redirects {
        let Some(target) = &redirect.target else {
            continue;
        };

        match redirect.kind {
            RedirectKind::StdinRead => {
                let path = shell.resolve_path(&target.to_string());
                stdin = Some(if path == NULL_DEVICE {
                    String::new()
                } else {
                    shell.fs().read_to_string(&path).await?
                });
            }
            RedirectKind::HereDocument => {
                stdin = Some(
                    params
                        .here_documents
                        .get(&target.to_string())
                        .map(str::to_owned)
                        .unwrap_or_default(),
                );
            }
            _ => (),
        }
    }

    Ok(stdin
        .or(piped_stdin)
        .unwrap_or_else(|| params.take_stdin()))
}

/// Resolves the segment's command and runs it. Builtins take priority over functions, then
/// registered commands, then executables found on the search path.
async fn dispatch(
    shell: &Shell,
    mut argv: Vec<String>,
    stdin: String,
    params: &ExecutionParameters,
) -> SegmentOutput {
    let name = argv.remove(0);
    let args = argv;
    tracing::debug!(target: trace_categories::COMMANDS, "dispatching: {name} {args:?}");

    if let Some(builtin) = shell.builtin(&name) {
        return invoke_command(shell, builtin.as_ref(), name, args, stdin, params).await;
    }

    if let Some(function) = shell.function(&name) {
        let call_params = params.capture_with_stdin(stdin);
        let result = invoke_function(shell, &function, &args, &call_params).await;
        return SegmentOutput::from_captured(shell, result, &call_params);
    }

    if let Some(command) = shell.command(&name) {
        return invoke_command(shell, command.as_ref(), name, args, stdin, params).await;
    }

    if let Some(path) = pathsearch::find_executable(shell, &name).await {
        let call_params = params.capture_with_stdin(stdin);
        let result = scripts::execute_file(shell, &path, &name, &args, &call_params).await;
        return SegmentOutput::from_captured(shell, result, &call_params);
    }

    SegmentOutput {
        halt_pipeline: true,
        ..SegmentOutput::failure(shell, &Error::CommandNotFound(name))
    }
}

/// Runs a builtin or registered command with a fresh context, containing any error or panic.
async fn invoke_command(
    shell: &Shell,
    command: &dyn Command,
    name: String,
    args: Vec<String>,
    stdin: String,
    params: &ExecutionParameters,
) -> SegmentOutput {
    let mut context = ExecutionContext::new(shell, params, name, args, stdin);

    let outcome = AssertUnwindSafe(command.execute(&mut context))
        .catch_unwind()
        .await;

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            context.report_error(&e);
            ExecutionResult::from(e.exit_code())
        }
        Err(_) => {
            let error = Error::CommandPanicked(context.command_name.clone());
            tracing::error!(target: trace_categories::COMMANDS, "{error}");
            let _ = writeln!(context.stderr, "{}: {error}", shell.shell_name());
            ExecutionResult::from(ExecutionExitCode::Fatal)
        }
    };

    SegmentOutput {
        result,
        stdout: context.stdout,
        stderr: context.stderr,
        halt_pipeline: false,
    }
}

/// Invokes a function with the given arguments as its positional parameters.
///
/// The caller's positional parameters are restored afterwards, whether or not the body
/// succeeded.
async fn invoke_function(
    shell: &Shell,
    function: &Registration,
    args: &[String],
    params: &ExecutionParameters,
) -> Result<ExecutionResult, Error> {
    let name = function.definition.name.as_str();
    if params.function_depth >= shell.options().max_function_call_depth {
        return Err(Error::MaxFunctionCallDepthExceeded(name.to_owned()));
    }
    tracing::debug!(target: trace_categories::FUNCTIONS, "calling {name} {args:?}");

    let call_params = ExecutionParameters {
        here_documents: function.here_documents.clone(),
        function_depth: params.function_depth + 1,
        ..params.clone()
    };

    let saved = shell.write_env(|env| env.bind_positional_parameters(name, args));
    let result = execute_source(shell, &function.definition.body, &call_params).await;
    shell.write_env(|env| env.restore_positional_parameters(saved));

    let mut result = result?;
    if result.next_control_flow == ExecutionControlFlow::ReturnFromFunctionOrScript {
        result.next_control_flow = ExecutionControlFlow::Normal;
    }
    Ok(result)
}

/// Applies a segment's output redirections once its command has finished.
///
/// Stream merges are applied first, then standard output redirections, then standard error
/// redirections. When a stream is redirected more than once, every target is created or
/// truncated but only the last receives the output.
async fn apply_output_redirects(
    shell: &Shell,
    redirects: &[Redirect],
    output: &mut SegmentOutput,
) -> Result<(), Error> {
    for redirect in redirects {
        match redirect.kind {
            RedirectKind::StderrToStdout => {
                let stderr = std::mem::take(&mut output.stderr);
                output.stdout.push_str(&stderr);
            }
            RedirectKind::StdoutToStderr => {
                let stdout = std::mem::take(&mut output.stdout);
                output.stderr.push_str(&stdout);
            }
            _ => (),
        }
    }

    let stdout_redirects: Vec<&Redirect> = redirects
        .iter()
        .filter(|r| {
            matches!(
                r.kind,
                RedirectKind::StdoutTruncate | RedirectKind::StdoutAppend
            )
        })
        .collect();
    write_redirected(shell, &stdout_redirects, &mut output.stdout).await?;

    let stderr_redirects: Vec<&Redirect> = redirects
        .iter()
        .filter(|r| {
            matches!(
                r.kind,
                RedirectKind::StderrTruncate | RedirectKind::StderrAppend
            )
        })
        .collect();
    write_redirected(shell, &stderr_redirects, &mut output.stderr).await
}

async fn write_redirected(
    shell: &Shell,
    redirects: &[&Redirect],
    stream: &mut String,
) -> Result<(), Error> {
    let Some((last, earlier)) = redirects.split_last() else {
        return Ok(());
    };

    let contents = std::mem::take(stream);
    for redirect in earlier {
        write_target(shell, redirect, "").await?;
    }
    write_target(shell, last, &contents).await
}

async fn write_target(shell: &Shell, redirect: &Redirect, contents: &str) -> Result<(), Error> {
    let Some(target) = &redirect.target else {
        return Ok(());
    };

    let path = shell.resolve_path(&target.to_string());
    if path == NULL_DEVICE {
        return Ok(());
    }

    let fs = shell.fs();
    let written = match redirect.kind {
        RedirectKind::StdoutAppend | RedirectKind::StderrAppend => {
            fs.append(&path, contents.as_bytes()).await
        }
        _ => fs.write(&path, contents.as_bytes()).await,
    };

    Ok(written?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loop_actions() {
        let mut result = ExecutionResult::success();
        assert_eq!(loop_action(&mut result), LoopAction::Next);

        result.next_control_flow = ExecutionControlFlow::ContinueLoop { levels: 0 };
        assert_eq!(loop_action(&mut result), LoopAction::Next);
        assert_eq!(result.next_control_flow, ExecutionControlFlow::Normal);

        result.next_control_flow = ExecutionControlFlow::BreakLoop { levels: 1 };
        assert_eq!(loop_action(&mut result), LoopAction::Exit);
        assert_eq!(
            result.next_control_flow,
            ExecutionControlFlow::BreakLoop { levels: 0 }
        );

        result.next_control_flow = ExecutionControlFlow::ExitShell;
        assert_eq!(loop_action(&mut result), LoopAction::Exit);
        assert_eq!(result.next_control_flow, ExecutionControlFlow::ExitShell);
    }

    #[test]
    fn lone_test_commands() {
        assert!(is_lone_test_command("[ -z \"\" ]"));
        assert!(is_lone_test_command("test 1 -eq 1"));
        assert!(!is_lone_test_command("[ -z x ] && true"));
        assert!(!is_lone_test_command("test -n x | cat"));
        assert!(!is_lone_test_command("tests"));
        assert!(!is_lone_test_command("echo [ x ]"));
    }

    #[test]
    fn here_documents_follow_extracted_text() {
        let (_, docs) = lash_parser::extract_here_documents("cat <<EOF\nbody\nEOF\n");
        let outer = ExecutionParameters::default().with_here_documents(docs);
        assert_eq!(outer.here_documents.get("0"), Some("body\n"));

        let unchanged = outer.with_here_documents(HereDocuments::default());
        assert_eq!(unchanged.here_documents.get("0"), Some("body\n"));

        let (_, docs) = lash_parser::extract_here_documents("cat <<EOF\nother\nEOF\n");
        let inner = outer.with_here_documents(docs);
        assert_eq!(inner.here_documents.get("0"), Some("other\n"));
        assert_eq!(outer.here_documents.get("0"), Some("body\n"));
    }
}
