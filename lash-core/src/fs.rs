//! The filesystem collaborator the interpreter reads and writes through.
//!
//! Paths are `/`-separated strings. Every path handed to a [`Filesystem`] by the interpreter
//! has already been made absolute with [`resolve_path`].

use std::time::SystemTime;

mod local;
mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

/// Categorized failure of a filesystem operation.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    /// The path does not exist.
    #[error("{0}: No such file or directory")]
    NotFound(String),

    /// A path component that must be a directory is not one.
    #[error("{0}: Not a directory")]
    NotADirectory(String),

    /// The operation requires a file but the path is a directory.
    #[error("{0}: Is a directory")]
    IsADirectory(String),

    /// The path already exists.
    #[error("{0}: File exists")]
    AlreadyExists(String),

    /// The directory is not empty.
    #[error("{0}: Directory not empty")]
    NotEmpty(String),

    /// The file's contents are not valid UTF-8 text.
    #[error("{0}: not a text file")]
    InvalidData(String),

    /// Any other I/O failure.
    #[error("{path}: {source}")]
    Io {
        /// The path being operated on.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },
}

/// The kind of a filesystem entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
}

/// Information about a filesystem entry.
#[derive(Clone, Debug)]
pub struct Metadata {
    /// The kind of entry.
    pub kind: FileKind,
    /// Size in bytes.
    pub len: u64,
    /// Last modification time, when known.
    pub modified: Option<SystemTime>,
    /// Whether the entry may not be written.
    pub readonly: bool,
    /// Whether the entry may be executed (or, for directories, searched).
    pub executable: bool,
}

impl Metadata {
    /// Returns whether the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Returns whether the entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

/// An immediate child of a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    /// The entry's file name.
    pub name: String,
    /// The kind of entry.
    pub kind: FileKind,
}

/// A store of named byte blobs organized into directories.
#[async_trait::async_trait]
pub trait Filesystem: Send + Sync {
    /// Resolves a possibly-relative path against a base directory.
    ///
    /// # Arguments
    ///
    /// * `base` - Absolute directory that relative paths are resolved against.
    /// * `path` - The path to resolve.
    fn resolve(&self, base: &str, path: &str) -> String {
        resolve_path(base, path)
    }

    /// Reads a file's full contents.
    async fn read(&self, path: &str) -> Result<Vec<u8>, FsError>;

    /// Reads a file's full contents as UTF-8 text.
    async fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes).map_err(|_| FsError::InvalidData(path.to_owned()))
    }

    /// Creates or overwrites a file.
    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), FsError>;

    /// Appends to a file, creating it if needed.
    async fn append(&self, path: &str, contents: &[u8]) -> Result<(), FsError>;

    /// Creates a directory; with `recursive`, missing parents are created and an existing
    /// directory is not an error.
    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError>;

    /// Lists a directory's immediate entries, sorted by name.
    async fn list(&self, path: &str) -> Result<Vec<DirEntry>, FsError>;

    /// Returns information about a path.
    async fn stat(&self, path: &str) -> Result<Metadata, FsError>;

    /// Deletes a file or directory; non-empty directories require `recursive`.
    async fn remove(&self, path: &str, recursive: bool) -> Result<(), FsError>;

    /// Returns the paths matching a glob pattern, sorted. Relative patterns are matched
    /// against `base` and yield relative paths.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The pattern; `\` escapes a metacharacter.
    /// * `base` - Absolute directory relative patterns are matched against.
    async fn glob(&self, pattern: &str, base: &str) -> Result<Vec<String>, FsError> {
        crate::patterns::expand_glob(self, pattern, base).await
    }
}

/// Normalizes an absolute path, collapsing `.`, `..`, and repeated separators.
///
/// # Arguments
///
/// * `path` - The path to normalize; a missing leading `/` is implied.
pub fn normalize_path(path: &str) -> String {
    let mut components: Vec<&str> = vec![];
    for component in path.split('/') {
        match component {
            "" | "." => (),
            ".." => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    format!("/{}", components.join("/"))
}

/// Resolves a possibly-relative path against an absolute base directory.
///
/// # Arguments
///
/// * `base` - The absolute base directory.
/// * `path` - The path to resolve.
pub fn resolve_path(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        normalize_path(path)
    } else {
        normalize_path(&format!("{base}/{path}"))
    }
}

/// Returns the parent directory of a normalized absolute path; the root is its own parent.
///
/// # Arguments
///
/// * `path` - A normalized absolute path.
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

/// Returns the final component of a path.
///
/// # Arguments
///
/// * `path` - The path.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalization() {
        assert_eq!(normalize_path("/a//b/./c/"), "/a/b/c");
        assert_eq!(normalize_path("/a/../../b"), "/b");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn resolution() {
        assert_eq!(resolve_path("/home/u", "docs/x.txt"), "/home/u/docs/x.txt");
        assert_eq!(resolve_path("/home/u", "../v"), "/home/v");
        assert_eq!(resolve_path("/home/u", "/etc"), "/etc");
    }

    #[test]
    fn components() {
        assert_eq!(parent_path("/a/b"), "/a");
        assert_eq!(parent_path("/a"), "/");
        assert_eq!(parent_path("/"), "/");
        assert_eq!(file_name("/a/b.txt"), "b.txt");
        assert_eq!(file_name("rel"), "rel");
    }
}
