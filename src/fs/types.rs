//! Filesystem capability types and trait.

use std::time::SystemTime;

use async_trait::async_trait;
use thiserror::Error;

/// Filesystem errors, errno-styled so command stderr reads like the real
/// utilities.
#[derive(Error, Debug, Clone)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },

    #[error("ENOTEMPTY: directory not empty, {operation} '{path}'")]
    NotEmpty { path: String, operation: String },

    #[error("EINVAL: invalid argument, {operation} '{path}'")]
    InvalidArgument { path: String, operation: String },

    #[error("ELOOP: too many levels of symbolic links, {operation} '{path}'")]
    SymlinkLoop { path: String, operation: String },

    #[error("{message}")]
    Other { message: String },
}

impl FsError {
    pub fn not_found(path: &str, operation: &str) -> Self {
        FsError::NotFound {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }
}

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
}

/// Status record returned by `stat`/`lstat`.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub size: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
    pub kind: FileKind,
}

impl FileStat {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }
}

/// Directory entry with type information (`list_entries`).
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileKind,
}

impl DirEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

/// Options for the `rm` operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmOptions {
    pub recursive: bool,
    pub force: bool,
}

/// External filesystem collaborator. All paths handed to the trait are
/// absolute; commands resolve relative paths against their cwd first via
/// [`FsCapability::resolve_path`].
#[async_trait]
pub trait FsCapability: Send + Sync {
    /// Read a file as UTF-8 text (lossy).
    async fn read(&self, path: &str) -> Result<String, FsError>;

    /// Read raw file bytes.
    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError>;

    /// Write a file, creating it (and missing parents) as needed.
    async fn write(&self, path: &str, content: &[u8]) -> Result<(), FsError>;

    /// List entry names of a directory, sorted.
    async fn list(&self, path: &str) -> Result<Vec<String>, FsError>;

    /// List entries of a directory with type information, sorted by name.
    async fn list_entries(&self, path: &str) -> Result<Vec<DirEntry>, FsError>;

    /// Status of a path, following symlinks.
    async fn stat(&self, path: &str) -> Result<FileStat, FsError>;

    /// Status of a path without following the final symlink.
    async fn lstat(&self, path: &str) -> Result<FileStat, FsError>;

    async fn exists(&self, path: &str) -> bool;

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError>;

    /// Remove an empty directory.
    async fn rmdir(&self, path: &str) -> Result<(), FsError>;

    /// Remove a file, or a directory when `options.recursive`.
    async fn rm(&self, path: &str, options: RmOptions) -> Result<(), FsError>;

    /// Copy a single file (not a directory).
    async fn copy_file(&self, src: &str, dest: &str) -> Result<(), FsError>;

    /// Rename a file or directory subtree.
    async fn rename(&self, src: &str, dest: &str) -> Result<(), FsError>;

    /// Set access and modification times.
    async fn utimes(
        &self,
        path: &str,
        atime: SystemTime,
        mtime: SystemTime,
    ) -> Result<(), FsError>;

    /// Truncate or zero-extend a file to `len` bytes.
    async fn truncate(&self, path: &str, len: u64) -> Result<(), FsError>;

    async fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError>;

    async fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<(), FsError>;

    /// Create a symbolic link at `link_path` pointing to `target`.
    async fn symlink(&self, target: &str, link_path: &str) -> Result<(), FsError>;

    /// Create a hard link.
    async fn link(&self, existing: &str, new_path: &str) -> Result<(), FsError>;

    /// Read the target of a symbolic link.
    async fn readlink(&self, path: &str) -> Result<String, FsError>;

    /// Resolve a possibly-relative path against a base directory.
    fn resolve_path(&self, base: &str, path: &str) -> String;
}
