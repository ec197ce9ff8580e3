use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use super::{DirEntry, FileKind, Filesystem, FsError, Metadata, normalize_path};

/// A filesystem backed by a directory on the host; the directory appears as `/`.
#[derive(Clone, Debug)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Returns a filesystem rooted at the given host directory.
    ///
    /// # Arguments
    ///
    /// * `root` - Host directory that will appear as `/`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns a filesystem exposing the host's own root directory.
    pub fn host() -> Self {
        Self::new("/")
    }

    fn host_path(&self, path: &str) -> PathBuf {
        let normalized = normalize_path(path);
        self.root.join(normalized.trim_start_matches('/'))
    }
}

fn convert_error(path: &str, error: std::io::Error) -> FsError {
    let path = path.to_owned();
    match error.kind() {
        ErrorKind::NotFound => FsError::NotFound(path),
        ErrorKind::NotADirectory => FsError::NotADirectory(path),
        ErrorKind::IsADirectory => FsError::IsADirectory(path),
        ErrorKind::AlreadyExists => FsError::AlreadyExists(path),
        ErrorKind::DirectoryNotEmpty => FsError::NotEmpty(path),
        _ => FsError::Io {
            path,
            source: error,
        },
    }
}

fn file_kind(file_type: std::fs::FileType) -> FileKind {
    if file_type.is_symlink() {
        FileKind::Symlink
    } else if file_type.is_dir() {
        FileKind::Directory
    } else {
        FileKind::File
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    metadata.is_dir()
}

#[async_trait::async_trait]
impl Filesystem for LocalFs {
    async fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        tokio::fs::read(self.host_path(path))
            .await
            .map_err(|e| convert_error(path, e))
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), FsError> {
        tokio::fs::write(self.host_path(path), contents)
            .await
            .map_err(|e| convert_error(path, e))
    }

    async fn append(&self, path: &str, contents: &[u8]) -> Result<(), FsError> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.host_path(path))
            .await
            .map_err(|e| convert_error(path, e))?;

        file.write_all(contents)
            .await
            .map_err(|e| convert_error(path, e))?;
        file.flush().await.map_err(|e| convert_error(path, e))
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let host_path = self.host_path(path);
        let result = if recursive {
            tokio::fs::create_dir_all(host_path).await
        } else {
            tokio::fs::create_dir(host_path).await
        };
        result.map_err(|e| convert_error(path, e))
    }

    async fn list(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let mut reader = tokio::fs::read_dir(self.host_path(path))
            .await
            .map_err(|e| convert_error(path, e))?;

        let mut entries = vec![];
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| convert_error(path, e))?
        {
            let kind = match entry.file_type().await {
                Ok(file_type) => file_kind(file_type),
                Err(_) => FileKind::File,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        let metadata = tokio::fs::symlink_metadata(self.host_path(path))
            .await
            .map_err(|e| convert_error(path, e))?;

        Ok(Metadata {
            kind: file_kind(metadata.file_type()),
            len: metadata.len(),
            modified: metadata.modified().ok(),
            readonly: metadata.permissions().readonly(),
            executable: is_executable(&metadata),
        })
    }

    async fn remove(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let host_path = self.host_path(path);
        let metadata = tokio::fs::symlink_metadata(&host_path)
            .await
            .map_err(|e| convert_error(path, e))?;

        let result = if !metadata.is_dir() {
            tokio::fs::remove_file(host_path).await
        } else if recursive {
            tokio::fs::remove_dir_all(host_path).await
        } else {
            tokio::fs::remove_dir(host_path).await
        };
        result.map_err(|e| convert_error(path, e))
    }
}
