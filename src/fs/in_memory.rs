//! In-memory implementation of the filesystem capability.
//!
//! A flat map of normalized absolute paths to nodes, with symlink
//! resolution and loop detection. Used by tests and by embedders that want
//! a virtual filesystem instead of a real mount.

use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::{DirEntry, FileKind, FileStat, FsCapability, FsError, RmOptions};

const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum NodeKind {
    File(Vec<u8>),
    Directory,
    Symlink(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    mode: u32,
    uid: u32,
    gid: u32,
    atime: SystemTime,
    mtime: SystemTime,
    ctime: SystemTime,
}

impl Node {
    fn new(kind: NodeKind, mode: u32) -> Self {
        let now = SystemTime::now();
        Self {
            kind,
            mode,
            uid: 1000,
            gid: 1000,
            atime: now,
            mtime: now,
            ctime: now,
        }
    }

    fn file(content: Vec<u8>) -> Self {
        Self::new(NodeKind::File(content), 0o644)
    }

    fn directory() -> Self {
        Self::new(NodeKind::Directory, 0o755)
    }

    fn symlink(target: String) -> Self {
        Self::new(NodeKind::Symlink(target), 0o777)
    }

    fn file_kind(&self) -> FileKind {
        match self.kind {
            NodeKind::File(_) => FileKind::File,
            NodeKind::Directory => FileKind::Directory,
            NodeKind::Symlink(_) => FileKind::Symlink,
        }
    }

    fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File(content) => content.len() as u64,
            NodeKind::Symlink(target) => target.len() as u64,
            NodeKind::Directory => 0,
        }
    }

    fn stat(&self) -> FileStat {
        FileStat {
            size: self.size(),
            mode: self.mode,
            uid: self.uid,
            gid: self.gid,
            atime: self.atime,
            mtime: self.mtime,
            ctime: self.ctime,
            kind: self.file_kind(),
        }
    }
}

/// In-memory virtual filesystem.
pub struct InMemoryFs {
    nodes: RwLock<HashMap<String, Node>>,
}

impl InMemoryFs {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("/".to_string(), Node::directory());
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Create a filesystem pre-populated with text files. Parent
    /// directories are created implicitly.
    pub async fn with_files(files: &[(&str, &str)]) -> Self {
        let fs = Self::new();
        for (path, content) in files {
            fs.write(&normalize(path), content.as_bytes())
                .await
                .expect("seed file");
        }
        fs
    }
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse `.`/`..` components and force a leading slash.
fn normalize(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }
    let mut resolved: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    if resolved.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", resolved.join("/"))
    }
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(pos) => path[..pos].to_string(),
        None => "/".to_string(),
    }
}

fn join_symlink_target(link_path: &str, target: &str) -> String {
    if target.starts_with('/') {
        normalize(target)
    } else {
        normalize(&format!("{}/{}", parent_of(link_path), target))
    }
}

/// Resolve symlinks in every component of `path`.
fn resolve_all(
    nodes: &HashMap<String, Node>,
    path: &str,
    operation: &str,
) -> Result<String, FsError> {
    resolve_inner(nodes, path, operation, true)
}

/// Resolve symlinks in every component except the last.
fn resolve_parents(
    nodes: &HashMap<String, Node>,
    path: &str,
    operation: &str,
) -> Result<String, FsError> {
    resolve_inner(nodes, path, operation, false)
}

fn resolve_inner(
    nodes: &HashMap<String, Node>,
    path: &str,
    operation: &str,
    follow_last: bool,
) -> Result<String, FsError> {
    let normalized = normalize(path);
    if normalized == "/" {
        return Ok(normalized);
    }
    let parts: Vec<&str> = normalized[1..].split('/').collect();
    let last = parts.len() - 1;
    let mut current = String::new();
    let mut visited: HashSet<String> = HashSet::new();

    for (i, part) in parts.iter().enumerate() {
        current = format!("{}/{}", current, part);
        if i == last && !follow_last {
            break;
        }
        let mut hops = 0;
        while let Some(Node {
            kind: NodeKind::Symlink(target),
            ..
        }) = nodes.get(&current)
        {
            if hops >= MAX_SYMLINK_HOPS || !visited.insert(current.clone()) {
                return Err(FsError::SymlinkLoop {
                    path: path.to_string(),
                    operation: operation.to_string(),
                });
            }
            current = join_symlink_target(&current, target);
            hops += 1;
        }
    }
    Ok(current)
}

fn ensure_parents(nodes: &mut HashMap<String, Node>, path: &str) {
    let parent = parent_of(path);
    if parent == "/" || nodes.contains_key(&parent) {
        return;
    }
    ensure_parents(nodes, &parent);
    nodes.insert(parent, Node::directory());
}

fn children_of<'a>(
    nodes: &'a HashMap<String, Node>,
    dir: &str,
) -> impl Iterator<Item = (&'a String, &'a Node)> {
    let prefix = if dir == "/" {
        "/".to_string()
    } else {
        format!("{}/", dir)
    };
    nodes.iter().filter(move |(path, _)| {
        path.starts_with(&prefix)
            && path.len() > prefix.len()
            && !path[prefix.len()..].contains('/')
    })
}

#[async_trait]
impl FsCapability for InMemoryFs {
    async fn read(&self, path: &str) -> Result<String, FsError> {
        let bytes = self.read_bytes(path).await?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let nodes = self.nodes.read().await;
        let resolved = resolve_all(&nodes, path, "open")?;
        match nodes.get(&resolved) {
            Some(Node {
                kind: NodeKind::File(content),
                ..
            }) => Ok(content.clone()),
            Some(Node {
                kind: NodeKind::Directory,
                ..
            }) => Err(FsError::IsDirectory {
                path: path.to_string(),
                operation: "read".to_string(),
            }),
            _ => Err(FsError::not_found(path, "open")),
        }
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let resolved = resolve_all(&nodes, path, "open")?;
        if let Some(Node {
            kind: NodeKind::Directory,
            ..
        }) = nodes.get(&resolved)
        {
            return Err(FsError::IsDirectory {
                path: path.to_string(),
                operation: "write".to_string(),
            });
        }
        ensure_parents(&mut nodes, &resolved);
        nodes.insert(resolved, Node::file(content.to_vec()));
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, FsError> {
        let entries = self.list_entries(path).await?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    async fn list_entries(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let nodes = self.nodes.read().await;
        let resolved = resolve_all(&nodes, path, "scandir")?;
        match nodes.get(&resolved) {
            Some(Node {
                kind: NodeKind::Directory,
                ..
            }) => {}
            Some(_) => {
                return Err(FsError::NotDirectory {
                    path: path.to_string(),
                    operation: "scandir".to_string(),
                })
            }
            None => return Err(FsError::not_found(path, "scandir")),
        }
        let mut entries: Vec<DirEntry> = children_of(&nodes, &resolved)
            .map(|(child, node)| DirEntry {
                name: child.rsplit('/').next().unwrap_or_default().to_string(),
                kind: node.file_kind(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        let nodes = self.nodes.read().await;
        let resolved = resolve_all(&nodes, path, "stat")?;
        nodes
            .get(&resolved)
            .map(Node::stat)
            .ok_or_else(|| FsError::not_found(path, "stat"))
    }

    async fn lstat(&self, path: &str) -> Result<FileStat, FsError> {
        let nodes = self.nodes.read().await;
        let resolved = resolve_parents(&nodes, path, "lstat")?;
        nodes
            .get(&resolved)
            .map(Node::stat)
            .ok_or_else(|| FsError::not_found(path, "lstat"))
    }

    async fn exists(&self, path: &str) -> bool {
        let nodes = self.nodes.read().await;
        match resolve_all(&nodes, path, "access") {
            Ok(resolved) => nodes.contains_key(&resolved),
            Err(_) => false,
        }
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let normalized = normalize(path);
        if let Some(node) = nodes.get(&normalized) {
            if matches!(node.kind, NodeKind::Directory) && recursive {
                return Ok(());
            }
            return Err(FsError::AlreadyExists {
                path: path.to_string(),
                operation: "mkdir".to_string(),
            });
        }
        let parent = parent_of(&normalized);
        if parent != "/" && !nodes.contains_key(&parent) {
            if !recursive {
                return Err(FsError::not_found(path, "mkdir"));
            }
            ensure_parents(&mut nodes, &normalized);
        }
        if let Some(node) = nodes.get(&parent) {
            if !matches!(node.kind, NodeKind::Directory) {
                return Err(FsError::NotDirectory {
                    path: path.to_string(),
                    operation: "mkdir".to_string(),
                });
            }
        }
        nodes.insert(normalized, Node::directory());
        Ok(())
    }

    async fn rmdir(&self, path: &str) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let resolved = resolve_all(&nodes, path, "rmdir")?;
        match nodes.get(&resolved) {
            Some(Node {
                kind: NodeKind::Directory,
                ..
            }) => {}
            Some(_) => {
                return Err(FsError::NotDirectory {
                    path: path.to_string(),
                    operation: "rmdir".to_string(),
                })
            }
            None => return Err(FsError::not_found(path, "rmdir")),
        }
        if children_of(&nodes, &resolved).next().is_some() {
            return Err(FsError::NotEmpty {
                path: path.to_string(),
                operation: "rmdir".to_string(),
            });
        }
        nodes.remove(&resolved);
        Ok(())
    }

    async fn rm(&self, path: &str, options: RmOptions) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let resolved = resolve_parents(&nodes, path, "unlink")?;
        match nodes.get(&resolved) {
            None => {
                if options.force {
                    return Ok(());
                }
                return Err(FsError::not_found(path, "unlink"));
            }
            Some(Node {
                kind: NodeKind::Directory,
                ..
            }) => {
                if !options.recursive {
                    return Err(FsError::IsDirectory {
                        path: path.to_string(),
                        operation: "unlink".to_string(),
                    });
                }
                let prefix = format!("{}/", resolved);
                nodes.retain(|p, _| p != &resolved && !p.starts_with(&prefix));
            }
            Some(_) => {
                nodes.remove(&resolved);
            }
        }
        Ok(())
    }

    async fn copy_file(&self, src: &str, dest: &str) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let src_resolved = resolve_all(&nodes, src, "copyfile")?;
        let content = match nodes.get(&src_resolved) {
            Some(Node {
                kind: NodeKind::File(content),
                mode,
                ..
            }) => (content.clone(), *mode),
            Some(_) => {
                return Err(FsError::IsDirectory {
                    path: src.to_string(),
                    operation: "copyfile".to_string(),
                })
            }
            None => return Err(FsError::not_found(src, "copyfile")),
        };
        let dest_resolved = resolve_parents(&nodes, dest, "copyfile")?;
        ensure_parents(&mut nodes, &dest_resolved);
        let mut node = Node::file(content.0);
        node.mode = content.1;
        nodes.insert(dest_resolved, node);
        Ok(())
    }

    async fn rename(&self, src: &str, dest: &str) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let src_resolved = resolve_parents(&nodes, src, "rename")?;
        if !nodes.contains_key(&src_resolved) {
            return Err(FsError::not_found(src, "rename"));
        }
        let dest_resolved = resolve_parents(&nodes, dest, "rename")?;
        ensure_parents(&mut nodes, &dest_resolved);

        let prefix = format!("{}/", src_resolved);
        let moved: Vec<(String, Node)> = nodes
            .iter()
            .filter(|(p, _)| **p == src_resolved || p.starts_with(&prefix))
            .map(|(p, n)| (p.clone(), n.clone()))
            .collect();
        for (p, _) in &moved {
            nodes.remove(p);
        }
        for (p, n) in moved {
            let new_path = format!("{}{}", dest_resolved, &p[src_resolved.len()..]);
            nodes.insert(new_path, n);
        }
        Ok(())
    }

    async fn utimes(
        &self,
        path: &str,
        atime: SystemTime,
        mtime: SystemTime,
    ) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let resolved = resolve_all(&nodes, path, "utime")?;
        match nodes.get_mut(&resolved) {
            Some(node) => {
                node.atime = atime;
                node.mtime = mtime;
                Ok(())
            }
            None => Err(FsError::not_found(path, "utime")),
        }
    }

    async fn truncate(&self, path: &str, len: u64) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let resolved = resolve_all(&nodes, path, "truncate")?;
        match nodes.get_mut(&resolved) {
            Some(Node {
                kind: NodeKind::File(content),
                mtime,
                ..
            }) => {
                content.resize(len as usize, 0);
                *mtime = SystemTime::now();
                Ok(())
            }
            Some(_) => Err(FsError::IsDirectory {
                path: path.to_string(),
                operation: "truncate".to_string(),
            }),
            None => Err(FsError::not_found(path, "truncate")),
        }
    }

    async fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let resolved = resolve_all(&nodes, path, "chmod")?;
        match nodes.get_mut(&resolved) {
            Some(node) => {
                node.mode = mode;
                Ok(())
            }
            None => Err(FsError::not_found(path, "chmod")),
        }
    }

    async fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let resolved = resolve_all(&nodes, path, "chown")?;
        match nodes.get_mut(&resolved) {
            Some(node) => {
                node.uid = uid;
                node.gid = gid;
                Ok(())
            }
            None => Err(FsError::not_found(path, "chown")),
        }
    }

    async fn symlink(&self, target: &str, link_path: &str) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let normalized = normalize(link_path);
        if nodes.contains_key(&normalized) {
            return Err(FsError::AlreadyExists {
                path: link_path.to_string(),
                operation: "symlink".to_string(),
            });
        }
        ensure_parents(&mut nodes, &normalized);
        nodes.insert(normalized, Node::symlink(target.to_string()));
        Ok(())
    }

    async fn link(&self, existing: &str, new_path: &str) -> Result<(), FsError> {
        let mut nodes = self.nodes.write().await;
        let src = resolve_all(&nodes, existing, "link")?;
        let node = match nodes.get(&src) {
            Some(Node {
                kind: NodeKind::Directory,
                ..
            }) => {
                return Err(FsError::IsDirectory {
                    path: existing.to_string(),
                    operation: "link".to_string(),
                })
            }
            Some(node) => node.clone(),
            None => return Err(FsError::not_found(existing, "link")),
        };
        let dest = normalize(new_path);
        if nodes.contains_key(&dest) {
            return Err(FsError::AlreadyExists {
                path: new_path.to_string(),
                operation: "link".to_string(),
            });
        }
        ensure_parents(&mut nodes, &dest);
        nodes.insert(dest, node);
        Ok(())
    }

    async fn readlink(&self, path: &str) -> Result<String, FsError> {
        let nodes = self.nodes.read().await;
        let resolved = resolve_parents(&nodes, path, "readlink")?;
        match nodes.get(&resolved) {
            Some(Node {
                kind: NodeKind::Symlink(target),
                ..
            }) => Ok(target.clone()),
            Some(_) => Err(FsError::InvalidArgument {
                path: path.to_string(),
                operation: "readlink".to_string(),
            }),
            None => Err(FsError::not_found(path, "readlink")),
        }
    }

    fn resolve_path(&self, base: &str, path: &str) -> String {
        if path.starts_with('/') {
            normalize(path)
        } else {
            normalize(&format!("{}/{}", base, path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/a/b/../c"), "/a/c");
        assert_eq!(normalize("/a//b/./"), "/a/b");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize(""), "/");
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let fs = InMemoryFs::new();
        fs.write("/dir/file.txt", b"hello").await.unwrap();
        assert_eq!(fs.read("/dir/file.txt").await.unwrap(), "hello");
        assert!(fs.exists("/dir").await);
    }

    #[tokio::test]
    async fn test_read_missing() {
        let fs = InMemoryFs::new();
        let err = fs.read("/nope").await.unwrap_err();
        assert!(err.to_string().contains("ENOENT"));
    }

    #[tokio::test]
    async fn test_list_entries_sorted() {
        let fs = InMemoryFs::with_files(&[("/d/b.txt", ""), ("/d/a.txt", "")]).await;
        fs.mkdir("/d/sub", false).await.unwrap();
        let entries = fs.list_entries("/d").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert!(entries[2].is_directory());
    }

    #[tokio::test]
    async fn test_stat_follows_symlink_lstat_does_not() {
        let fs = InMemoryFs::with_files(&[("/real.txt", "data")]).await;
        fs.symlink("/real.txt", "/link").await.unwrap();
        assert!(fs.stat("/link").await.unwrap().is_file());
        assert!(fs.lstat("/link").await.unwrap().is_symlink());
        assert_eq!(fs.readlink("/link").await.unwrap(), "/real.txt");
    }

    #[tokio::test]
    async fn test_symlink_loop_detected() {
        let fs = InMemoryFs::new();
        fs.symlink("/b", "/a").await.unwrap();
        fs.symlink("/a", "/b").await.unwrap();
        let err = fs.read("/a").await.unwrap_err();
        assert!(err.to_string().contains("ELOOP"));
    }

    #[tokio::test]
    async fn test_mkdir_non_recursive_requires_parent() {
        let fs = InMemoryFs::new();
        assert!(fs.mkdir("/a/b", false).await.is_err());
        fs.mkdir("/a/b", true).await.unwrap();
        assert!(fs.exists("/a/b").await);
    }

    #[tokio::test]
    async fn test_rmdir_refuses_non_empty() {
        let fs = InMemoryFs::with_files(&[("/d/f", "x")]).await;
        assert!(fs.rmdir("/d").await.is_err());
        fs.rm("/d/f", RmOptions::default()).await.unwrap();
        fs.rmdir("/d").await.unwrap();
        assert!(!fs.exists("/d").await);
    }

    #[tokio::test]
    async fn test_rm_recursive_and_force() {
        let fs = InMemoryFs::with_files(&[("/d/a", "1"), ("/d/sub/b", "2")]).await;
        assert!(fs.rm("/d", RmOptions::default()).await.is_err());
        fs.rm(
            "/d",
            RmOptions {
                recursive: true,
                force: false,
            },
        )
        .await
        .unwrap();
        assert!(!fs.exists("/d/sub/b").await);
        fs.rm(
            "/missing",
            RmOptions {
                recursive: false,
                force: true,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_rename_moves_subtree() {
        let fs = InMemoryFs::with_files(&[("/src/a", "1"), ("/src/sub/b", "2")]).await;
        fs.rename("/src", "/dst").await.unwrap();
        assert_eq!(fs.read("/dst/sub/b").await.unwrap(), "2");
        assert!(!fs.exists("/src").await);
    }

    #[tokio::test]
    async fn test_truncate() {
        let fs = InMemoryFs::with_files(&[("/f", "hello world")]).await;
        fs.truncate("/f", 5).await.unwrap();
        assert_eq!(fs.read("/f").await.unwrap(), "hello");
        fs.truncate("/f", 7).await.unwrap();
        assert_eq!(fs.read_bytes("/f").await.unwrap(), b"hello\0\0");
    }

    #[tokio::test]
    async fn test_chmod_chown() {
        let fs = InMemoryFs::with_files(&[("/f", "")]).await;
        fs.chmod("/f", 0o600).await.unwrap();
        assert_eq!(fs.stat("/f").await.unwrap().mode, 0o600);
        fs.chown("/f", 0, 0).await.unwrap();
        let st = fs.stat("/f").await.unwrap();
        assert_eq!((st.uid, st.gid), (0, 0));
    }

    #[tokio::test]
    async fn test_hard_link_copies_content() {
        let fs = InMemoryFs::with_files(&[("/f", "data")]).await;
        fs.link("/f", "/g").await.unwrap();
        assert_eq!(fs.read("/g").await.unwrap(), "data");
    }

    #[test]
    fn test_resolve_path() {
        let fs = InMemoryFs::new();
        assert_eq!(fs.resolve_path("/home", "file.txt"), "/home/file.txt");
        assert_eq!(fs.resolve_path("/home", "/abs.txt"), "/abs.txt");
        assert_eq!(fs.resolve_path("/home", "../etc/hosts"), "/etc/hosts");
    }
}
