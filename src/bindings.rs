//! Collaborator bindings consumed by the router: RPC services, module
//! loaders, language workers, and the sandbox. All are shared, non-owned;
//! the router never closes them.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::commands::types::FetchResponse;
use crate::types::{ExecOptions, ExecutionResult};

/// Wire-format result shared by the RPC and language-worker lanes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResult {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(rename = "exitCode", default)]
    pub exit_code: i32,
}

/// Request body posted to RPC services.
#[derive(Debug, Clone, Serialize)]
pub struct WireRequest<'a> {
    pub command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<&'a HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// A service-binding object with its own transport.
#[async_trait]
pub trait ServiceFetcher: Send + Sync {
    /// POST `body` (JSON) to `path` on the service.
    async fn fetch(&self, path: &str, body: String) -> Result<FetchResponse, String>;
}

/// Transport for one RPC service.
#[derive(Clone)]
pub enum RpcEndpoint {
    /// Plain HTTP endpoint; the router posts to `<url>/execute` through
    /// its fetch callback.
    Url(String),
    /// Binding object; the router posts to `/` on it.
    Fetcher(Arc<dyn ServiceFetcher>),
}

impl std::fmt::Debug for RpcEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RpcEndpoint::Url(url) => f.debug_tuple("Url").field(url).finish(),
            RpcEndpoint::Fetcher(_) => f.debug_tuple("Fetcher").field(&"<binding>").finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RpcServiceBinding {
    pub name: String,
    pub endpoint: RpcEndpoint,
    pub commands: Vec<String>,
}

impl RpcServiceBinding {
    pub fn url(name: &str, url: &str, commands: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            endpoint: RpcEndpoint::Url(url.to_string()),
            commands: commands.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Entry point exposed by a dynamically loaded module.
pub type ModuleEntry = Arc<
    dyn Fn(Vec<String>) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send>>
        + Send
        + Sync,
>;

/// A module produced by a loader: named async entry points. The loader
/// lane probes `run`, `main`, `default` in that order.
#[derive(Default)]
pub struct LoadedModule {
    entries: HashMap<&'static str, ModuleEntry>,
}

impl LoadedModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: &'static str, entry: ModuleEntry) -> Self {
        self.entries.insert(name, entry);
        self
    }

    pub fn entry_point(&self) -> Option<&ModuleEntry> {
        ["run", "main", "default"]
            .iter()
            .find_map(|name| self.entries.get(name))
    }
}

#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, module: &str) -> Result<LoadedModule, String>;
}

#[derive(Clone)]
pub struct WorkerLoaderBinding {
    pub name: String,
    pub loader: Arc<dyn ModuleLoader>,
    pub modules: Vec<String>,
}

/// Executes a command inside a warm runtime for one language.
#[async_trait]
pub trait LanguageWorkerBinding: Send + Sync {
    async fn execute(
        &self,
        command: &str,
        language: &str,
        options: &ExecOptions,
    ) -> Result<WireResult, String>;
}

/// Handle to a spawned streaming process; only the sandbox can produce
/// one.
#[async_trait]
pub trait SpawnHandle: Send + std::fmt::Debug {
    /// Wait for the process to finish.
    async fn wait(&mut self) -> ExecutionResult;
    /// Best-effort termination.
    async fn kill(&mut self);
    fn pid(&self) -> Option<u32>;
}

/// Full-sandbox binding (Tier 4).
#[async_trait]
pub trait SandboxBinding: Send + Sync {
    async fn execute(
        &self,
        command: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, String>;

    fn supports_spawn(&self) -> bool {
        false
    }

    async fn spawn(
        &self,
        _command: &str,
        _args: &[String],
        _options: &ExecOptions,
    ) -> Result<Box<dyn SpawnHandle>, String> {
        Err("spawn is not supported by this sandbox".to_string())
    }
}
