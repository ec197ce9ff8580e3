//! Configuration file support for the lash shell.
//!
//! - Forward-compatible: unknown fields are ignored
//! - A malformed file at the default location is logged and ignored; a malformed file named
//!   with `--config` is an error
//! - Layered configuration: defaults < config file < command-line arguments

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;

use crate::args::CommandLineArgs;

/// Root configuration structure for the lash shell.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpreter policy.
    pub interpreter: InterpreterConfig,

    /// Extra variables seeded into the shell's environment.
    pub environment: HashMap<String, String>,
}

/// Interpreter policy options.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InterpreterConfig {
    /// Iterations after which a loop is stopped as runaway.
    pub max_loop_iterations: Option<usize>,

    /// Maximum nesting of function calls.
    pub max_function_call_depth: Option<usize>,

    /// Directories searched for executables before `PATH`.
    pub local_bin_dirs: Vec<String>,
}

/// Errors that can occur when loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigLoadError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {1}", path = .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    /// Failed to parse the TOML content.
    #[error("failed to parse config file {path}: {1}", path = .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),
}

impl Config {
    /// Applies the configuration to shell creation options; values given on the command line
    /// take precedence.
    ///
    /// # Arguments
    ///
    /// * `args` - The parsed command-line arguments.
    /// * `options` - The options to update.
    pub fn apply(&self, args: &CommandLineArgs, options: &mut lash_core::CreateOptions) {
        if let Some(max) = args
            .max_loop_iterations
            .or(self.interpreter.max_loop_iterations)
        {
            options.max_loop_iterations = max;
        }

        if let Some(max) = args
            .max_function_call_depth
            .or(self.interpreter.max_function_call_depth)
        {
            options.max_function_call_depth = max;
        }

        // Command-line directories are searched first.
        options.local_bin_dirs.extend(
            args.local_bin_dirs
                .iter()
                .chain(&self.interpreter.local_bin_dirs)
                .cloned(),
        );

        for (name, value) in &self.environment {
            options
                .env
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

/// Returns the default configuration file path for the current platform.
pub fn default_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("lash").join("config.toml"))
}

/// Loads configuration from the specified path.
///
/// # Arguments
///
/// * `path` - The file to load.
pub fn load_from_path(path: &Path) -> Result<Config, ConfigLoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigLoadError::Io(path.to_path_buf(), e))?;

    toml::from_str(&content).map_err(|e| ConfigLoadError::Parse(path.to_path_buf(), e))
}

/// Loads configuration based on the command-line arguments.
///
/// # Arguments
///
/// * `args` - The parsed command-line arguments.
pub fn load_config(args: &CommandLineArgs) -> Result<Config, ConfigLoadError> {
    if args.no_config {
        return Ok(Config::default());
    }

    if let Some(path) = &args.config_file {
        return load_from_path(path);
    }

    let Some(path) = default_config_path() else {
        return Ok(Config::default());
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!("{e}; using default configuration");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config() -> Result<()> {
        let config: Config = toml::from_str("")?;
        assert!(config.interpreter.max_loop_iterations.is_none());
        assert!(config.environment.is_empty());
        Ok(())
    }

    #[test]
    fn full_config_with_unknown_fields() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [interpreter]
            max-loop-iterations = 50
            max-function-call-depth = 8
            local-bin-dirs = ["/opt/bin"]
            future-feature = true

            [environment]
            EDITOR = "vi"

            [unknown-section]
            foo = "bar"
        "#,
        )?;

        assert_eq!(config.interpreter.max_loop_iterations, Some(50));
        assert_eq!(config.interpreter.max_function_call_depth, Some(8));
        assert_eq!(config.interpreter.local_bin_dirs, vec!["/opt/bin"]);
        assert_eq!(config.environment.get("EDITOR").map(String::as_str), Some("vi"));
        Ok(())
    }

    #[test]
    fn command_line_takes_precedence() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [interpreter]
            max-loop-iterations = 50
            max-function-call-depth = 8
            local-bin-dirs = ["/opt/bin"]
        "#,
        )?;
        let args = CommandLineArgs::try_parse_from([
            "lash",
            "--max-loop-iterations",
            "7",
            "--local-bin-dir",
            "/first",
        ])?;

        let mut options = lash_core::CreateOptions::default();
        config.apply(&args, &mut options);

        assert_eq!(options.max_loop_iterations, 7);
        assert_eq!(options.max_function_call_depth, 8);
        assert_eq!(options.local_bin_dirs, vec!["/first", "/opt/bin"]);
        Ok(())
    }

    #[test]
    fn explicit_missing_file_is_an_error() -> Result<()> {
        let args = CommandLineArgs::try_parse_from([
            "lash",
            "--config",
            "/nonexistent/path/to/config.toml",
        ])?;
        assert!(matches!(load_config(&args), Err(ConfigLoadError::Io(..))));
        Ok(())
    }

    #[test]
    fn explicit_malformed_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[interpreter\nmax-loop-iterations = ")?;

        assert!(matches!(load_from_path(&path), Err(ConfigLoadError::Parse(..))));
        Ok(())
    }

    #[test]
    fn default_config_path_is_namespaced() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("lash/config.toml"));
        }
    }
}
