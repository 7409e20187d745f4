//! tierbox - a tiered command-execution router for sandboxed edge runtimes
//!
//! Receives shell-style command lines (single commands and pipelines),
//! classifies each into the cheapest capable execution lane, executes it
//! there, and returns a normalized result record. As much as possible is
//! served in-process by the native command library; escalation goes to RPC
//! services, dynamic module loaders, warm language workers, or a full
//! sandbox, all supplied by the embedder as bindings.

pub mod bindings;
pub mod classifier;
pub mod commands;
pub mod executors;
pub mod fs;
pub mod metrics;
pub mod router;
pub mod tokenizer;
pub mod types;

pub use bindings::{
    LanguageWorkerBinding, LoadedModule, ModuleEntry, ModuleLoader, RpcEndpoint,
    RpcServiceBinding, SandboxBinding, ServiceFetcher, SpawnHandle, WireResult,
    WorkerLoaderBinding,
};
pub use classifier::language::{DefaultLanguageRouter, LanguageRoute, LanguageRouter, RouteTarget};
pub use classifier::safety::{BasicSafetyAnalyzer, SafetyAnalyzer};
pub use commands::{Command, CommandContext, CommandResult, FetchFn, FetchResponse};
pub use executors::{LaneError, LaneExecutor};
pub use fs::{FsCapability, FsError, InMemoryFs};
pub use metrics::{CacheStats, MetricsSnapshot};
pub use router::{default_rpc_services, CapabilitySnapshot, RouterError, RouterOptions, TierRouter};
pub use types::{ExecOptions, ExecutionResult, Handler, SandboxStrategy, Tier, TierClassification};
