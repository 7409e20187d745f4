//! Shared types for the native command library.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::fs::FsCapability;

/// Callback for re-entering the router from inside a native command
/// (xargs, env with a subcommand, timeout).
/// Parameters: command line, stdin, cwd, env.
pub type ExecFn = Arc<
    dyn Fn(
            String,
            String,
            String,
            HashMap<String, String>,
        ) -> Pin<Box<dyn Future<Output = CommandResult> + Send>>
        + Send
        + Sync,
>;

/// HTTP response handed back by the embedder's fetch callback.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub url: String,
}

impl FetchResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == lower)
            .map(|(_, v)| v.as_str())
    }
}

/// Callback for HTTP requests (curl, wget, npm registry lookups, and the
/// RPC endpoint form). Parameters: url, method, headers, body.
pub type FetchFn = Arc<
    dyn Fn(
            String,
            String,
            HashMap<String, String>,
            Option<String>,
        ) -> Pin<Box<dyn Future<Output = Result<FetchResponse, String>> + Send>>
        + Send
        + Sync,
>;

/// Result of one native command execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn error(stderr: String) -> Self {
        Self {
            stdout: String::new(),
            stderr,
            exit_code: 1,
        }
    }

    pub fn with_exit_code(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
        }
    }
}

/// Everything a native command sees: argv, stdin, environment, and the
/// optional collaborators it may use.
pub struct CommandContext {
    pub args: Vec<String>,
    pub stdin: String,
    pub cwd: String,
    pub env: HashMap<String, String>,
    pub fs: Option<Arc<dyn FsCapability>>,
    pub exec_fn: Option<ExecFn>,
    pub fetch_fn: Option<FetchFn>,
}

impl CommandContext {
    /// The filesystem capability, or an exit-1 result naming the command.
    pub fn require_fs(&self, command: &str) -> Result<Arc<dyn FsCapability>, CommandResult> {
        self.fs.clone().ok_or_else(|| {
            CommandResult::error(format!("{}: filesystem capability not available\n", command))
        })
    }

    /// Resolve a possibly-relative path against the context cwd.
    pub fn resolve(&self, fs: &Arc<dyn FsCapability>, path: &str) -> String {
        fs.resolve_path(&self.cwd, path)
    }
}

/// A native command implementation.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    async fn execute(&self, ctx: CommandContext) -> CommandResult;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::fs::InMemoryFs;

    /// Bare context: no fs, no callbacks.
    pub fn ctx(args: Vec<&str>) -> CommandContext {
        CommandContext {
            args: args.into_iter().map(String::from).collect(),
            stdin: String::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs: None,
            exec_fn: None,
            fetch_fn: None,
        }
    }

    pub fn ctx_with_stdin(args: Vec<&str>, stdin: &str) -> CommandContext {
        let mut c = ctx(args);
        c.stdin = stdin.to_string();
        c
    }

    pub async fn ctx_with_files(args: Vec<&str>, files: &[(&str, &str)]) -> CommandContext {
        let mut c = ctx(args);
        c.fs = Some(Arc::new(InMemoryFs::with_files(files).await));
        c
    }
}
