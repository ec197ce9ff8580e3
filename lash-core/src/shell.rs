use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::commands::Command;
use crate::env::{self, ShellEnvironment};
use crate::error::Error;
use crate::fs::Filesystem;
use crate::functions::{self, FunctionEnv};
use crate::history::History;
use crate::interp::{self, ExecutionParameters};
use crate::jobs::{self, JobInfo, JobManager};
use crate::results::ExecutionResult;
use crate::{builtins, scripts, trace_categories};

/// Default search path seeded into `PATH`.
pub const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Options for creating a new shell.
#[derive(Clone, Debug, bon::Builder)]
pub struct CreateOptions {
    /// Extra variables to seed into the environment; they override the well-known defaults.
    #[builder(field)]
    pub env: HashMap<String, String>,
    /// Directories searched for executables before `PATH`.
    #[builder(field)]
    pub local_bin_dirs: Vec<String>,
    /// Name of the shell, used as `$0` and to prefix error messages.
    #[builder(into, default = String::from("lash"))]
    pub shell_name: String,
    /// Home directory, seeded into `HOME` and used for tilde expansion.
    #[builder(into, default = String::from("/"))]
    pub home: String,
    /// User name, seeded into `USER`.
    #[builder(into, default = String::from("user"))]
    pub user: String,
    /// Initial working directory; defaults to the home directory.
    #[builder(into)]
    pub working_dir: Option<String>,
    /// Colon-separated executable search path, seeded into `PATH`.
    #[builder(into, default = String::from(DEFAULT_PATH))]
    pub path: String,
    /// Terminal type, seeded into `TERM`.
    #[builder(into, default = String::from("xterm-256color"))]
    pub term: String,
    /// Iterations after which a `while`, `until` or `for` loop is stopped as runaway.
    #[builder(default = 10_000)]
    pub max_loop_iterations: usize,
    /// Maximum nesting of function calls.
    #[builder(default = 256)]
    pub max_function_call_depth: usize,
    /// Whether to register the default command plugins (`echo`, `cat`, `cd`, ...).
    #[builder(default = true)]
    pub include_default_commands: bool,
}

impl<S: create_options_builder::State> CreateOptionsBuilder<S> {
    /// Add a variable to seed into the environment.
    pub fn env_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Add many variables to seed into the environment.
    pub fn env_vars(
        mut self,
        vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a directory to search for executables before `PATH`.
    pub fn local_bin_dir(mut self, dir: impl Into<String>) -> Self {
        self.local_bin_dirs.push(dir.into());
        self
    }
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Interpreter policy fixed at creation time.
#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    /// Name of the shell.
    pub shell_name: String,
    /// Directories searched for executables before `PATH`.
    pub local_bin_dirs: Vec<String>,
    /// Iterations after which a loop is stopped.
    pub max_loop_iterations: usize,
    /// Maximum nesting of function calls.
    pub max_function_call_depth: usize,
}

/// Represents an instance of a shell session.
///
/// `Shell` is a cheap handle: clones share the same state. Background jobs hold clones, so
/// their assignments and directory changes are visible to the foreground session.
#[derive(Clone)]
pub struct Shell {
    inner: Arc<ShellState>,
}

struct ShellState {
    fs: Arc<dyn Filesystem>,
    options: RuntimeOptions,
    env: RwLock<ShellEnvironment>,
    working_dir: RwLock<String>,
    functions: RwLock<FunctionEnv>,
    jobs: Mutex<JobManager>,
    history: Mutex<History>,
    builtins: HashMap<&'static str, Arc<dyn Command>>,
    commands: RwLock<HashMap<String, Arc<dyn Command>>>,
    last_exit_code: AtomicU8,
}

impl Shell {
    /// Returns a new shell instance created with the given options.
    ///
    /// # Arguments
    ///
    /// * `fs` - The filesystem the shell operates on.
    /// * `options` - The options to use when creating the shell.
    pub fn new(fs: Arc<dyn Filesystem>, options: CreateOptions) -> Self {
        let working_dir = crate::fs::normalize_path(
            options.working_dir.as_deref().unwrap_or(options.home.as_str()),
        );

        let mut environment = ShellEnvironment::new();
        environment.set("HOME", options.home.as_str());
        environment.set("USER", options.user.as_str());
        environment.set("SHELL", format!("/bin/{}", options.shell_name));
        environment.set("PATH", options.path.as_str());
        environment.set("PWD", working_dir.as_str());
        environment.set("TERM", options.term.as_str());
        environment.set("0", options.shell_name.as_str());
        environment.set(env::LAST_EXIT_CODE, "0");
        for (name, value) in &options.env {
            environment.set(name.as_str(), value.as_str());
        }

        let commands = if options.include_default_commands {
            builtins::default_commands()
                .into_iter()
                .map(|c| (c.name().to_owned(), c))
                .collect()
        } else {
            HashMap::new()
        };

        Self {
            inner: Arc::new(ShellState {
                fs,
                options: RuntimeOptions {
                    shell_name: options.shell_name,
                    local_bin_dirs: options.local_bin_dirs,
                    max_loop_iterations: options.max_loop_iterations,
                    max_function_call_depth: options.max_function_call_depth,
                },
                env: RwLock::new(environment),
                working_dir: RwLock::new(working_dir),
                functions: RwLock::new(FunctionEnv::default()),
                jobs: Mutex::new(JobManager::default()),
                history: Mutex::new(History::default()),
                builtins: builtins::fixed_builtins().into_iter().collect(),
                commands: RwLock::new(commands),
                last_exit_code: AtomicU8::new(0),
            }),
        }
    }

    /// Executes the given string as shell text, recording it in the history.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to execute; may span multiple lines.
    /// * `params` - Where output goes.
    pub async fn run_string(
        &self,
        text: &str,
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(text);

        interp::execute_text(self, text, params).await
    }

    /// Runs a script file with the given arguments as its positional parameters.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the script, resolved against the working directory.
    /// * `args` - Arguments to the script.
    /// * `params` - Where output goes.
    pub async fn run_script(
        &self,
        path: &str,
        args: &[String],
        params: &ExecutionParameters,
    ) -> Result<ExecutionResult, Error> {
        let resolved = self.resolve_path(path);
        scripts::run_script_file(self, &resolved, path, args, params).await
    }

    /// Registers a command plugin, replacing any plugin of the same name.
    ///
    /// # Arguments
    ///
    /// * `command` - The plugin.
    pub fn register_command(&self, command: Arc<dyn Command>) {
        tracing::debug!(target: trace_categories::COMMANDS, "registering command: {}", command.name());
        self.inner
            .commands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(command.name().to_owned(), command);
    }

    /// Returns the registered command plugin with the given name.
    ///
    /// # Arguments
    ///
    /// * `name` - The plugin's name.
    pub fn command(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.inner
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Returns the names and descriptions of all registered command plugins, sorted by name.
    pub fn command_descriptions(&self) -> Vec<(String, String)> {
        let commands = self
            .inner
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut descriptions: Vec<(String, String)> = commands
            .values()
            .map(|c| (c.name().to_owned(), c.description().to_owned()))
            .collect();
        descriptions.sort();
        descriptions
    }

    pub(crate) fn builtin(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.inner.builtins.get(name).cloned()
    }

    /// Returns the value of a variable, if set.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable's name.
    pub fn env_var(&self, name: &str) -> Option<String> {
        self.read_env(|env| env.get(name).map(ToOwned::to_owned))
    }

    /// Sets a variable.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable's name.
    /// * `value` - The new value.
    pub fn set_env_var(&self, name: impl Into<String>, value: impl Into<String>) {
        self.write_env(|env| env.set(name, value));
    }

    /// Removes a variable, returning its previous value.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable's name.
    pub fn unset_env_var(&self, name: &str) -> Option<String> {
        self.write_env(|env| env.unset(name))
    }

    /// Returns a copy of all variables.
    pub fn env_snapshot(&self) -> HashMap<String, String> {
        self.read_env(ShellEnvironment::to_map)
    }

    pub(crate) fn read_env<T>(&self, f: impl FnOnce(&ShellEnvironment) -> T) -> T {
        f(&self
            .inner
            .env
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn write_env<T>(&self, f: impl FnOnce(&mut ShellEnvironment) -> T) -> T {
        f(&mut self
            .inner
            .env
            .write()
            .unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the current working directory.
    pub fn working_dir(&self) -> String {
        self.inner
            .working_dir
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Changes the working directory without checking that it exists; updates `PWD` and
    /// `OLDPWD`.
    ///
    /// # Arguments
    ///
    /// * `path` - The new directory, resolved against the current one.
    pub fn set_working_dir(&self, path: &str) {
        let new_dir = self.resolve_path(path);
        let old_dir = std::mem::replace(
            &mut *self
                .inner
                .working_dir
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            new_dir.clone(),
        );

        self.write_env(|env| {
            env.set("OLDPWD", old_dir);
            env.set("PWD", new_dir);
        });
    }

    /// Resolves a path against the current working directory.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to resolve.
    pub fn resolve_path(&self, path: &str) -> String {
        self.inner.fs.resolve(&self.working_dir(), path)
    }

    /// Returns the exit code of the most recently completed command.
    pub fn last_exit_code(&self) -> u8 {
        self.inner.last_exit_code.load(Ordering::Relaxed)
    }

    pub(crate) fn set_last_exit_code(&self, code: u8) {
        self.inner.last_exit_code.store(code, Ordering::Relaxed);
        self.set_env_var(env::LAST_EXIT_CODE, code.to_string());
    }

    /// Returns the lines submitted through [`Self::run_string`], oldest first.
    pub fn history(&self) -> Vec<String> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec()
    }

    /// Returns snapshots of all background jobs, by id.
    pub fn jobs_snapshot(&self) -> Vec<JobInfo> {
        self.with_jobs_mut(|jobs| jobs.snapshot())
    }

    /// Waits for every background job started so far to finish.
    pub async fn wait_for_jobs(&self) -> Result<Vec<JobInfo>, Error> {
        jobs::wait(self, None).await?;
        Ok(self.jobs_snapshot())
    }

    /// Waits for one background job to finish, returning its final snapshot.
    ///
    /// # Arguments
    ///
    /// * `id` - The job's id.
    pub async fn wait_for_job(&self, id: usize) -> Result<Option<JobInfo>, Error> {
        jobs::wait(self, Some(id)).await?;
        Ok(self.with_jobs_mut(|jobs| jobs.get(id)))
    }

    pub(crate) fn with_jobs_mut<T>(&self, f: impl FnOnce(&mut JobManager) -> T) -> T {
        f(&mut self
            .inner
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the definition of a function, if one is defined.
    ///
    /// # Arguments
    ///
    /// * `name` - The function's name.
    pub fn function(&self, name: &str) -> Option<Arc<functions::Registration>> {
        self.inner
            .functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Returns the names of all defined functions, sorted.
    pub fn function_names(&self) -> Vec<String> {
        self.inner
            .functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names()
    }

    pub(crate) fn define_function(&self, registration: functions::Registration) {
        tracing::debug!(target: trace_categories::FUNCTIONS, "defining function: {}", registration.definition.name);
        self.inner
            .functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .update(registration);
    }

    pub(crate) fn undefine_function(&self, name: &str) -> bool {
        self.inner
            .functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    /// Returns the filesystem the shell operates on.
    pub fn fs(&self) -> &Arc<dyn Filesystem> {
        &self.inner.fs
    }

    /// Returns the shell's runtime options.
    pub fn options(&self) -> &RuntimeOptions {
        &self.inner.options
    }

    /// Returns the shell's name.
    pub fn shell_name(&self) -> &str {
        &self.inner.options.shell_name
    }
}
