use std::marker::PhantomData;
use std::sync::Arc;

use clap::error::ErrorKind;

#[allow(clippy::wildcard_imports)]
use super::*;
use crate::commands::Command;
use crate::results::ExecutionExitCode;

/// Returns the builtins that take priority over functions and command plugins.
pub(crate) fn fixed_builtins() -> Vec<(&'static str, Arc<dyn Command>)> {
    vec![
        ("eval", simple_builtin::<eval::EvalCommand>("eval")),
        (".", builtin::<dot::DotCommand>(".")),
        ("source", builtin::<dot::DotCommand>("source")),
        ("set", simple_builtin::<set::SetCommand>("set")),
        ("shopt", simple_builtin::<set::ShoptCommand>("shopt")),
        (":", simple_builtin::<colon::ColonCommand>(":")),
        ("return", builtin::<return_::ReturnCommand>("return")),
        ("break", builtin::<break_::BreakCommand>("break")),
        ("continue", builtin::<continue_::ContinueCommand>("continue")),
        ("exit", builtin::<exit::ExitCommand>("exit")),
    ]
}

/// Returns the default set of command plugins.
pub(crate) fn default_commands() -> Vec<Arc<dyn Command>> {
    vec![
        simple_builtin::<echo::EchoCommand>("echo"),
        builtin::<cat::CatCommand>("cat"),
        simple_builtin::<true_::TrueCommand>("true"),
        simple_builtin::<false_::FalseCommand>("false"),
        builtin::<pwd::PwdCommand>("pwd"),
        builtin::<cd::CdCommand>("cd"),
        builtin::<export::ExportCommand>("export"),
        builtin::<unset::UnsetCommand>("unset"),
        builtin::<env_::EnvCommand>("env"),
        builtin::<sleep::SleepCommand>("sleep"),
        simple_builtin::<test::TestCommand>("test"),
        simple_builtin::<test::TestCommand>("["),
        builtin::<jobs::JobsCommand>("jobs"),
        builtin::<wait::WaitCommand>("wait"),
        builtin::<history::HistoryCommand>("history"),
    ]
}

/// Returns a command backed by an implementation of the [`BuiltinCommand`] trait.
///
/// # Arguments
///
/// * `name` - The name the command is invoked by.
pub fn builtin<B: BuiltinCommand + 'static>(name: &'static str) -> Arc<dyn Command> {
    let description = B::command()
        .get_about()
        .map_or_else(String::new, ToString::to_string);

    Arc::new(ParsedBuiltin::<B> {
        name,
        description,
        _marker: PhantomData,
    })
}

/// Returns a command backed by an implementation of the [`SimpleCommand`] trait.
///
/// # Arguments
///
/// * `name` - The name the command is invoked by.
pub fn simple_builtin<B: SimpleCommand + 'static>(name: &'static str) -> Arc<dyn Command> {
    Arc::new(RawBuiltin::<B> {
        name,
        _marker: PhantomData,
    })
}

struct ParsedBuiltin<B> {
    name: &'static str,
    description: String,
    _marker: PhantomData<fn() -> B>,
}

#[async_trait::async_trait]
impl<B: BuiltinCommand + 'static> Command for ParsedBuiltin<B> {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        let args = std::iter::once(self.name.to_owned()).chain(context.args.iter().cloned());

        let command = match B::new(args) {
            Ok(command) => command,
            Err(e) => {
                let rendered = e.render().to_string();
                if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                    context.stdout.push_str(&rendered);
                    return Ok(ExecutionResult::success());
                }

                context.stderr.push_str(&rendered);
                return Ok(ExecutionResult::from(ExecutionExitCode::InvalidUsage));
            }
        };

        command.execute(context).await
    }
}

struct RawBuiltin<B> {
    name: &'static str,
    _marker: PhantomData<fn() -> B>,
}

#[async_trait::async_trait]
impl<B: SimpleCommand + 'static> Command for RawBuiltin<B> {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        B::description()
    }

    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, error::Error> {
        B::execute(context).await
    }
}
