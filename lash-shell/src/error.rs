use crate::config::ConfigLoadError;

/// Errors that stop the shell before or while it runs its input.
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    /// The interpreter failed.
    #[error(transparent)]
    Shell(#[from] lash_core::Error),

    /// A host I/O operation failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
