//! Implements the command-line interface for the `lash` shell.

#![deny(missing_docs)]

mod args;
mod config;
mod error;
mod events;

use std::sync::Arc;

use clap::Parser;
use lash_core::fs::{Filesystem, LocalFs, MemoryFs};
use lash_core::{CreateOptions, ExecutionParameters, OutputSink, Shell};
use tokio::io::AsyncReadExt;

use crate::args::CommandLineArgs;
use crate::error::ShellError;

/// Main entry point for the `lash` shell.
fn main() {
    human_panic::setup_panic!(
        human_panic::Metadata::new(env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"))
            .homepage(env!("CARGO_PKG_REPOSITORY"))
    );

    let args = CommandLineArgs::parse();
    events::init(&args.enabled_log_events);

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ShellError::from)
        .and_then(|runtime| runtime.block_on(run(args)));

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("error: {e}");
            1
        }
    };

    std::process::exit(i32::from(exit_code));
}

/// Runs the shell on the input selected by the command line. Returns the exit code.
///
/// # Arguments
///
/// * `args` - The parsed command-line arguments.
async fn run(args: CommandLineArgs) -> Result<u8, ShellError> {
    let config = config::load_config(&args)?;
    let shell = instantiate_shell(&args, &config);
    let params = ExecutionParameters::new(OutputSink::Stdout, OutputSink::Stderr);

    let result = if let Some(command) = &args.command {
        shell.run_string(command, &params).await?
    } else if let Some(script_path) = &args.script_path {
        shell
            .run_script(script_path, &args.script_args, &params)
            .await?
    } else {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        shell.run_string(&text, &params).await?
    };

    // Let background jobs finish so their errors are reported.
    shell.wait_for_jobs().await?;

    Ok(result.code())
}

fn instantiate_shell(args: &CommandLineArgs, config: &config::Config) -> Shell {
    let mut options = CreateOptions::builder()
        .maybe_user(std::env::var("USER").ok())
        .build();

    let fs: Arc<dyn Filesystem> = if args.in_memory {
        Arc::new(MemoryFs::new())
    } else if let Some(root) = &args.root {
        Arc::new(LocalFs::new(root.clone()))
    } else {
        // The host's own tree: start where the process was started.
        if let Ok(home) = std::env::var("HOME") {
            options.home = home;
        }
        options.working_dir = std::env::current_dir()
            .ok()
            .and_then(|dir| dir.to_str().map(ToOwned::to_owned));
        Arc::new(LocalFs::host())
    };

    config.apply(args, &mut options);
    tracing::debug!(target: "commands", "creating shell with {options:?}");

    Shell::new(fs, options)
}
