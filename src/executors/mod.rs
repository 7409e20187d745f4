//! Executor adapters: one small object per lane, carried on the
//! classification so callers can dispatch polymorphically
//! (`classification.executor.execute(...)`) instead of switching on the
//! tier.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::classifier::sets;
use crate::router::RouterInner;
use crate::tokenizer;
use crate::types::{ExecOptions, ExecutionResult, SandboxStrategy};

/// Lane-infrastructure failure: the lane itself could not run. Distinct
/// from a command failing with a non-zero exit, which is reported in-band
/// and never raised through this type.
#[derive(Debug, Error)]
pub enum LaneError {
    #[error("network error: {0}")]
    Network(String),
    #[error("loader failure: {0}")]
    Loader(String),
    #[error("worker failure: {0}")]
    Worker(String),
    #[error("sandbox failure: {0}")]
    Sandbox(String),
    #[error("{0}")]
    Unavailable(String),
}

/// The uniform executor contract all lanes satisfy.
#[async_trait]
pub trait LaneExecutor: Send + Sync {
    async fn execute(
        &self,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError>;

    fn can_execute(&self, line: &str) -> bool;
}

pub struct NativeExecutor {
    pub(crate) router: Arc<RouterInner>,
    pub(crate) capability: String,
}

#[async_trait]
impl LaneExecutor for NativeExecutor {
    async fn execute(
        &self,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError> {
        self.router.run_native(line, options, &self.capability).await
    }

    fn can_execute(&self, line: &str) -> bool {
        let name = tokenizer::command_name(line);
        sets::TIER1_NATIVE_COMMANDS.contains(name.as_str()) || name == "npm"
    }
}

pub struct RpcExecutor {
    pub(crate) router: Arc<RouterInner>,
    pub(crate) service: String,
}

#[async_trait]
impl LaneExecutor for RpcExecutor {
    async fn execute(
        &self,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError> {
        self.router.run_rpc(line, options, &self.service).await
    }

    fn can_execute(&self, line: &str) -> bool {
        let name = tokenizer::command_name(line);
        self.router.rpc_service_for(&name).is_some()
    }
}

pub struct LoaderExecutor {
    pub(crate) router: Arc<RouterInner>,
}

#[async_trait]
impl LaneExecutor for LoaderExecutor {
    async fn execute(
        &self,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError> {
        self.router.run_loader(line, options).await
    }

    fn can_execute(&self, line: &str) -> bool {
        let name = tokenizer::command_name(line);
        self.router.loader_advertises(&name) || sets::TIER3_LOADABLE_MODULES.contains(name.as_str())
    }
}

pub struct PolyglotExecutor {
    pub(crate) router: Arc<RouterInner>,
    pub(crate) language: String,
}

#[async_trait]
impl LaneExecutor for PolyglotExecutor {
    async fn execute(
        &self,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError> {
        self.router
            .run_polyglot(line, options, &self.language)
            .await
    }

    fn can_execute(&self, _line: &str) -> bool {
        self.router.has_worker(&self.language)
    }
}

pub struct SandboxExecutor {
    pub(crate) router: Arc<RouterInner>,
    pub(crate) strategy: Option<SandboxStrategy>,
}

#[async_trait]
impl LaneExecutor for SandboxExecutor {
    async fn execute(
        &self,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError> {
        self.router
            .run_sandbox(line, options, self.strategy.as_ref(), None)
            .await
    }

    fn can_execute(&self, _line: &str) -> bool {
        self.router.has_sandbox()
    }
}
