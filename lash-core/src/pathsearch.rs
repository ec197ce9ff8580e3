//! Resolution of command names to files.

use crate::{Shell, fs, trace_categories};

/// Returns the directories searched for executables: local bin directories first, then the
/// entries of `PATH`.
pub(crate) fn search_dirs(shell: &Shell) -> Vec<String> {
    let path = shell.env_var("PATH").unwrap_or_default();

    shell
        .options()
        .local_bin_dirs
        .iter()
        .map(String::as_str)
        .chain(path.split(':'))
        .filter(|dir| !dir.is_empty())
        .map(|dir| shell.resolve_path(dir))
        .collect()
}

/// Finds the file a command name refers to.
///
/// A name containing `/` is resolved against the working directory and may name a directory;
/// other names are looked up as regular files in the search directories.
///
/// # Arguments
///
/// * `shell` - The shell whose search path and filesystem are used.
/// * `name` - The command name.
pub(crate) async fn find_executable(shell: &Shell, name: &str) -> Option<String> {
    if name.contains('/') {
        let path = shell.resolve_path(name);
        return shell.fs().stat(&path).await.ok().map(|_| path);
    }

    for dir in search_dirs(shell) {
        let candidate = fs::resolve_path(&dir, name);
        if shell
            .fs()
            .stat(&candidate)
            .await
            .is_ok_and(|metadata| metadata.is_file())
        {
            tracing::debug!(target: trace_categories::COMMANDS, "resolved {name} to {candidate}");
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreateOptions;
    use crate::fs::{Filesystem, MemoryFs};
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn local_bin_dirs_come_first() -> Result<()> {
        let fs = Arc::new(MemoryFs::new());
        fs.mkdir("/opt/bin", true).await?;
        fs.mkdir("/usr/bin", true).await?;
        fs.write("/opt/bin/tool", b"echo local").await?;
        fs.write("/usr/bin/tool", b"echo path").await?;
        fs.write("/usr/bin/other", b"echo other").await?;
        fs.mkdir("/usr/bin/dir", false).await?;

        let shell = Shell::new(
            fs,
            CreateOptions::builder()
                .path("/usr/bin")
                .local_bin_dir("/opt/bin")
                .build(),
        );

        assert_eq!(
            find_executable(&shell, "tool").await.as_deref(),
            Some("/opt/bin/tool")
        );
        assert_eq!(
            find_executable(&shell, "other").await.as_deref(),
            Some("/usr/bin/other")
        );
        assert_eq!(find_executable(&shell, "dir").await, None);
        assert_eq!(
            find_executable(&shell, "/usr/bin/dir").await.as_deref(),
            Some("/usr/bin/dir")
        );
        assert_eq!(find_executable(&shell, "missing").await, None);
        Ok(())
    }
}
