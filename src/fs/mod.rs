//! Filesystem capability.
//!
//! The router does not touch any real disk; every fs-class command goes
//! through the [`FsCapability`] trait supplied by the embedder. When no
//! capability is configured, fs-class commands are downgraded to the
//! sandbox lane at classification time.

mod in_memory;
mod types;

pub use in_memory::InMemoryFs;
pub use types::{DirEntry, FileKind, FileStat, FsCapability, FsError, RmOptions};
