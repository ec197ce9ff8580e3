use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use super::{DirEntry, FileKind, Filesystem, FsError, Metadata, normalize_path, parent_path};

#[derive(Clone, Debug)]
enum Node {
    File { data: Vec<u8>, modified: SystemTime },
    Directory { modified: SystemTime },
}

impl Node {
    fn directory() -> Self {
        Self::Directory {
            modified: SystemTime::now(),
        }
    }

    const fn kind(&self) -> FileKind {
        match self {
            Self::File { .. } => FileKind::File,
            Self::Directory { .. } => FileKind::Directory,
        }
    }
}

/// An in-memory filesystem. Nothing touches the host; contents live as long as the value.
#[derive(Debug)]
pub struct MemoryFs {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Returns a filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_owned(), Node::directory());
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    fn read_nodes(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Node>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Node>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn child_prefix(path: &str) -> String {
    if path == "/" {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}

fn children<'a>(
    nodes: &'a BTreeMap<String, Node>,
    path: &str,
) -> impl Iterator<Item = (&'a String, &'a Node)> {
    let prefix = child_prefix(path);
    nodes
        .range(prefix.clone()..)
        .take_while(move |(key, _)| key.starts_with(&prefix))
        .filter(|(key, _)| key.as_str() != "/")
}

/// Checks that the parent of `path` exists and is a directory.
fn check_parent(nodes: &BTreeMap<String, Node>, path: &str) -> Result<(), FsError> {
    match nodes.get(parent_path(path)) {
        Some(Node::Directory { .. }) => Ok(()),
        Some(Node::File { .. }) => Err(FsError::NotADirectory(parent_path(path).to_owned())),
        None => Err(FsError::NotFound(path.to_owned())),
    }
}

fn write_file(
    nodes: &mut BTreeMap<String, Node>,
    path: &str,
    contents: &[u8],
    append: bool,
) -> Result<(), FsError> {
    check_parent(nodes, path)?;

    match nodes.get_mut(path) {
        Some(Node::Directory { .. }) => Err(FsError::IsADirectory(path.to_owned())),
        Some(Node::File { data, modified }) => {
            if !append {
                data.clear();
            }
            data.extend_from_slice(contents);
            *modified = SystemTime::now();
            Ok(())
        }
        None => {
            nodes.insert(
                path.to_owned(),
                Node::File {
                    data: contents.to_vec(),
                    modified: SystemTime::now(),
                },
            );
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl Filesystem for MemoryFs {
    async fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let path = normalize_path(path);
        let nodes = self.read_nodes();
        match nodes.get(&path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Err(FsError::IsADirectory(path)),
            None => Err(FsError::NotFound(path)),
        }
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), FsError> {
        let path = normalize_path(path);
        write_file(&mut self.write_nodes(), &path, contents, false)
    }

    async fn append(&self, path: &str, contents: &[u8]) -> Result<(), FsError> {
        let path = normalize_path(path);
        write_file(&mut self.write_nodes(), &path, contents, true)
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let path = normalize_path(path);
        let mut nodes = self.write_nodes();

        match nodes.get(&path) {
            Some(Node::Directory { .. }) if recursive => return Ok(()),
            Some(_) => return Err(FsError::AlreadyExists(path)),
            None => (),
        }

        if !recursive {
            check_parent(&nodes, &path)?;
            nodes.insert(path, Node::directory());
            return Ok(());
        }

        let mut current = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            current.push('/');
            current.push_str(component);
            match nodes.get(&current) {
                Some(Node::Directory { .. }) => (),
                Some(Node::File { .. }) => return Err(FsError::NotADirectory(current)),
                None => {
                    nodes.insert(current.clone(), Node::directory());
                }
            }
        }

        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let path = normalize_path(path);
        let nodes = self.read_nodes();

        match nodes.get(&path) {
            Some(Node::Directory { .. }) => (),
            Some(Node::File { .. }) => return Err(FsError::NotADirectory(path)),
            None => return Err(FsError::NotFound(path)),
        }

        let prefix_len = child_prefix(&path).len();
        Ok(children(&nodes, &path)
            .filter(|(key, _)| !key[prefix_len..].contains('/'))
            .map(|(key, node)| DirEntry {
                name: key[prefix_len..].to_owned(),
                kind: node.kind(),
            })
            .collect())
    }

    async fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        let path = normalize_path(path);
        let nodes = self.read_nodes();

        match nodes.get(&path) {
            Some(Node::File { data, modified }) => Ok(Metadata {
                kind: FileKind::File,
                len: data.len() as u64,
                modified: Some(*modified),
                readonly: false,
                executable: data.starts_with(b"#!"),
            }),
            Some(Node::Directory { modified }) => Ok(Metadata {
                kind: FileKind::Directory,
                len: 0,
                modified: Some(*modified),
                readonly: false,
                executable: true,
            }),
            None => Err(FsError::NotFound(path)),
        }
    }

    async fn remove(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let path = normalize_path(path);
        let mut nodes = self.write_nodes();

        match nodes.get(&path) {
            None => return Err(FsError::NotFound(path)),
            Some(Node::File { .. }) => {
                nodes.remove(&path);
                return Ok(());
            }
            Some(Node::Directory { .. }) => (),
        }

        let descendants: Vec<String> = children(&nodes, &path).map(|(k, _)| k.clone()).collect();
        if !descendants.is_empty() && !recursive {
            return Err(FsError::NotEmpty(path));
        }

        for key in descendants {
            nodes.remove(&key);
        }
        if path != "/" {
            nodes.remove(&path);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn write_append_read() -> Result<()> {
        let fs = MemoryFs::new();
        fs.write("/f.txt", b"hello\n").await?;
        fs.append("/f.txt", b"world\n").await?;
        assert_eq!(fs.read_to_string("/f.txt").await?, "hello\nworld\n");

        fs.write("/f.txt", b"x\n").await?;
        assert_eq!(fs.read_to_string("/f.txt").await?, "x\n");
        Ok(())
    }

    #[tokio::test]
    async fn categorized_errors() -> Result<()> {
        let fs = MemoryFs::new();
        fs.mkdir("/d", false).await?;
        fs.write("/d/f", b"1").await?;

        assert!(matches!(fs.read("/missing").await, Err(FsError::NotFound(_))));
        assert!(matches!(fs.read("/d").await, Err(FsError::IsADirectory(_))));
        assert!(matches!(
            fs.write("/nope/f", b"").await,
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            fs.write("/d/f/g", b"").await,
            Err(FsError::NotADirectory(_))
        ));
        assert!(matches!(
            fs.mkdir("/d", false).await,
            Err(FsError::AlreadyExists(_))
        ));
        assert!(matches!(fs.remove("/d", false).await, Err(FsError::NotEmpty(_))));
        Ok(())
    }

    #[tokio::test]
    async fn directories() -> Result<()> {
        let fs = MemoryFs::new();
        fs.mkdir("/a/b/c", true).await?;
        fs.mkdir("/a/b", true).await?;
        fs.write("/a/x.txt", b"").await?;
        fs.write("/a/b/c/deep", b"").await?;

        let names: Vec<String> = fs.list("/a").await?.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b", "x.txt"]);
        assert!(fs.stat("/a/b").await?.is_dir());

        fs.remove("/a", true).await?;
        assert!(fs.stat("/a/b/c/deep").await.is_err());
        assert!(fs.list("/").await?.is_empty());
        Ok(())
    }
}
