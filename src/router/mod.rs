//! The tier router: the public executor over all lanes.
//!
//! Handles input redirection, pipeline execution, per-segment
//! classification and dispatch, and the single cross-tier fallback policy
//! (a thrown lane failure below tier 4 re-runs in the sandbox).

pub mod pipeline;

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use lazy_static::lazy_static;
use regex_lite::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::bindings::{
    LanguageWorkerBinding, RpcEndpoint, RpcServiceBinding, SandboxBinding, SpawnHandle,
    WireRequest, WireResult, WorkerLoaderBinding,
};
use crate::classifier::cache::DEFAULT_CACHE_CAPACITY;
use crate::classifier::language::{DefaultLanguageRouter, LanguageRouter};
use crate::classifier::safety::{BasicSafetyAnalyzer, SafetyAnalyzer};
use crate::classifier::{sets, TierClassifier};
use crate::commands::types::{CommandContext, CommandResult, ExecFn, FetchFn};
use crate::commands::NativeLane;
use crate::executors::{
    LaneError, LaneExecutor, LoaderExecutor, NativeExecutor, PolyglotExecutor, RpcExecutor,
    SandboxExecutor,
};
use crate::fs::FsCapability;
use crate::metrics::{CacheStats, MetricsRecorder, MetricsSnapshot};
use crate::tokenizer;
use crate::types::{ExecOptions, ExecutionResult, Handler, SandboxStrategy, Tier, TierClassification};

lazy_static! {
    static ref INPUT_REDIRECT_RE: Regex = Regex::new(r"^(.+?)\s*<\s*(\S+)\s*$").unwrap();
}

/// Errors surfaced to callers. Command failures are never errors; they
/// come back as results with a non-zero exit code.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A lane failed and no sandbox was configured to fall back to.
    #[error("execution lane failed: {0}")]
    Lane(#[from] LaneError),
    #[error("spawn requires a sandbox binding with spawn support")]
    SpawnUnsupported,
    #[error("spawn failed: {0}")]
    Spawn(String),
}

/// Construction-time bindings. All collaborators are optional; a router
/// with none of them still serves the native lane.
#[derive(Default)]
pub struct RouterOptions {
    pub fs: Option<Arc<dyn FsCapability>>,
    pub fetch_fn: Option<FetchFn>,
    /// `None` selects the default service table.
    pub rpc_services: Option<Vec<RpcServiceBinding>>,
    pub loaders: Vec<WorkerLoaderBinding>,
    pub language_workers: HashMap<String, Arc<dyn LanguageWorkerBinding>>,
    pub sandbox: Option<Arc<dyn SandboxBinding>>,
    pub language_router: Option<Arc<dyn LanguageRouter>>,
    pub safety_analyzer: Option<Arc<dyn SafetyAnalyzer>>,
    pub cache_capacity: Option<usize>,
    pub metrics: bool,
}

/// Default RPC services, pre-registered unless overridden.
pub fn default_rpc_services() -> Vec<RpcServiceBinding> {
    vec![
        RpcServiceBinding::url("jq", "https://jq.do", &["jq"]),
        RpcServiceBinding::url(
            "npm",
            "https://npm.do",
            &["npm", "npx", "pnpm", "yarn", "bun"],
        ),
        RpcServiceBinding::url("git", "https://git.do", &["git"]),
        RpcServiceBinding::url(
            "pyx",
            "https://pyx.do",
            &["pyx", "python", "pip", "pipx", "uvx"],
        ),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct Tier1Capabilities {
    pub available: bool,
    #[serde(rename = "fsAvailable")]
    pub fs_available: bool,
    #[serde(rename = "commandCount")]
    pub command_count: usize,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tier2Capabilities {
    #[serde(rename = "rpcServices")]
    pub rpc_services: Vec<String>,
    #[serde(rename = "polyglotLanguages")]
    pub polyglot_languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tier3Capabilities {
    pub loaders: Vec<String>,
    #[serde(rename = "loadableModules")]
    pub loadable_modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tier4Capabilities {
    #[serde(rename = "sandboxAvailable")]
    pub sandbox_available: bool,
    #[serde(rename = "spawnAvailable")]
    pub spawn_available: bool,
}

/// Snapshot of which tiers are available and what they can handle.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilitySnapshot {
    pub tier1: Tier1Capabilities,
    pub tier2: Tier2Capabilities,
    pub tier3: Tier3Capabilities,
    pub tier4: Tier4Capabilities,
}

pub struct RouterInner {
    self_ref: Weak<RouterInner>,
    native: NativeLane,
    fs: Option<Arc<dyn FsCapability>>,
    fetch_fn: Option<FetchFn>,
    rpc_bindings: HashMap<String, RpcServiceBinding>,
    rpc_reverse: HashMap<String, String>,
    loaders: Vec<WorkerLoaderBinding>,
    language_workers: HashMap<String, Arc<dyn LanguageWorkerBinding>>,
    sandbox: Option<Arc<dyn SandboxBinding>>,
    classifier: TierClassifier,
    metrics: Arc<MetricsRecorder>,
}

impl RouterInner {
    pub(crate) fn rpc_service_for(&self, name: &str) -> Option<&String> {
        self.rpc_reverse.get(name)
    }

    pub(crate) fn loader_advertises(&self, name: &str) -> bool {
        self.loaders
            .iter()
            .any(|l| l.modules.iter().any(|m| m == name))
    }

    pub(crate) fn has_worker(&self, language: &str) -> bool {
        self.language_workers.contains_key(language)
    }

    pub(crate) fn has_sandbox(&self) -> bool {
        self.sandbox.is_some()
    }

    fn self_arc(&self) -> Option<Arc<RouterInner>> {
        self.self_ref.upgrade()
    }

    /// Classify and bind the lane adapter for polymorphic dispatch.
    pub(crate) fn classify_with_executor(&self, line: &str) -> TierClassification {
        let mut classification = self.classifier.classify(line);
        if let Some(router) = self.self_arc() {
            let executor: Arc<dyn LaneExecutor> = match classification.handler {
                Handler::Native => Arc::new(NativeExecutor {
                    router,
                    capability: classification.capability.clone(),
                }),
                Handler::Rpc => Arc::new(RpcExecutor {
                    router,
                    service: classification.capability.clone(),
                }),
                Handler::Loader => Arc::new(LoaderExecutor { router }),
                Handler::Polyglot => Arc::new(PolyglotExecutor {
                    router,
                    language: classification.capability.clone(),
                }),
                Handler::Sandbox => Arc::new(SandboxExecutor {
                    router,
                    strategy: classification.sandbox_strategy.clone(),
                }),
            };
            classification.executor = Some(executor);
        }
        classification
    }

    /// Top-level execution: input redirection, then the pipeline.
    pub(crate) async fn execute_line(
        &self,
        line: &str,
        options: ExecOptions,
    ) -> Result<ExecutionResult, RouterError> {
        let mut line = line.trim().to_string();
        let mut options = options;

        if line.is_empty() {
            return Ok(ExecutionResult {
                input: String::new(),
                stdout: String::new(),
                stderr: String::new(),
                exit_code: 0,
                intent: String::new(),
                classification: "empty command".to_string(),
                tier: Tier::Native,
                handler: Handler::Native,
            });
        }

        // Simple trailing input redirection, repeatable; output
        // redirection is not recognized.
        while let Some((left, file)) = parse_input_redirect(&line) {
            let Some(fs) = &self.fs else {
                return Ok(self.failure(
                    &line,
                    format!("cannot open {}: filesystem capability not available\n", file),
                ));
            };
            let cwd = options.cwd.as_deref().unwrap_or("/");
            let resolved = fs.resolve_path(cwd, &file);
            match fs.read(&resolved).await {
                Ok(content) => {
                    options.stdin = Some(content);
                    line = left;
                }
                Err(_) => {
                    return Ok(self.failure(&line, format!("cannot open {}\n", file)));
                }
            }
        }

        if !pipeline::has_pipeline(&line) {
            return self.execute_single(&line, &options).await;
        }

        let segments = pipeline::split_pipeline(&line);
        let mut stdin = options.stdin.clone();
        let mut last: Option<ExecutionResult> = None;
        for segment in &segments {
            let mut segment_options = options.clone();
            segment_options.stdin = stdin.take();
            let result = self.execute_single(segment, &segment_options).await?;
            let failed = result.exit_code != 0;
            stdin = Some(result.stdout.clone());
            last = Some(result);
            if failed {
                // Pipefail semantics: later segments are neither
                // classified nor executed.
                break;
            }
        }
        let mut result = last.expect("pipeline yields at least one segment result");
        result.input = line.clone();
        result.intent = intent_of(&line);
        Ok(result)
    }

    /// Execute one already-split command, with the cross-tier fallback
    /// policy.
    pub(crate) async fn execute_single(
        &self,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, RouterError> {
        let classification = self.classify_with_executor(line);
        let outcome = match &classification.executor {
            Some(executor) => executor.execute(line, options).await,
            // A classification without a bound adapter still runs.
            None => self.dispatch(&classification, line, options).await,
        };
        match outcome {
            Ok(result) => Ok(result),
            Err(error) => {
                if classification.tier != Tier::Sandbox && self.sandbox.is_some() {
                    tracing::warn!(
                        command = %tokenizer::command_name(line),
                        tier = classification.tier.level(),
                        error = %error,
                        "lane failed, falling back to sandbox"
                    );
                    self.run_sandbox(
                        line,
                        options,
                        classification.sandbox_strategy.as_ref(),
                        Some(classification.tier),
                    )
                    .await
                    .map_err(RouterError::Lane)
                } else {
                    Err(RouterError::Lane(error))
                }
            }
        }
    }

    async fn dispatch(
        &self,
        classification: &TierClassification,
        line: &str,
        options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError> {
        match classification.handler {
            Handler::Native => {
                self.run_native(line, options, &classification.capability).await
            }
            Handler::Rpc => self.run_rpc(line, options, &classification.capability).await,
            Handler::Loader => self.run_loader(line, options).await,
            Handler::Polyglot => {
                self.run_polyglot(line, options, &classification.capability).await
            }
            Handler::Sandbox => {
                self.run_sandbox(line, options, classification.sandbox_strategy.as_ref(), None)
                    .await
            }
        }
    }

    pub(crate) async fn run_native(
        &self,
        line: &str,
        options: &ExecOptions,
        capability: &str,
    ) -> Result<ExecutionResult, LaneError> {
        let name = tokenizer::command_name(line);
        let command = self.native.get(capability, &name).ok_or_else(|| {
            LaneError::Unavailable(format!(
                "no native handler for '{}' in class {}",
                name, capability
            ))
        })?;
        let ctx = CommandContext {
            args: tokenizer::argv(line),
            stdin: options.stdin.clone().unwrap_or_default(),
            cwd: options.cwd.clone().unwrap_or_else(|| "/".to_string()),
            env: options.env.clone().unwrap_or_default(),
            fs: self.fs.clone(),
            exec_fn: Some(self.make_exec_fn()),
            fetch_fn: self.fetch_fn.clone(),
        };
        let result = command.execute(ctx).await;
        Ok(self.finish(
            line,
            result,
            Tier::Native,
            Handler::Native,
            format!("Tier 1: Native ({})", capability),
        ))
    }

    pub(crate) async fn run_rpc(
        &self,
        line: &str,
        options: &ExecOptions,
        service: &str,
    ) -> Result<ExecutionResult, LaneError> {
        let binding = self.rpc_bindings.get(service).ok_or_else(|| {
            LaneError::Unavailable(format!("no rpc binding for service '{}'", service))
        })?;
        let request = WireRequest {
            command: line,
            cwd: options.cwd.as_deref(),
            env: options.env.as_ref(),
            timeout: options.timeout_ms,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| LaneError::Unavailable(e.to_string()))?;

        let response = match &binding.endpoint {
            RpcEndpoint::Url(url) => {
                let fetch = self.fetch_fn.clone().ok_or_else(|| {
                    LaneError::Network("no fetch callback configured for RPC".to_string())
                })?;
                let mut headers = HashMap::new();
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                fetch(
                    format!("{}/execute", url.trim_end_matches('/')),
                    "POST".to_string(),
                    headers,
                    Some(body),
                )
                .await
                .map_err(LaneError::Network)?
            }
            RpcEndpoint::Fetcher(fetcher) => fetcher
                .fetch("/", body)
                .await
                .map_err(LaneError::Network)?,
        };

        let summary = format!("Tier 2: RPC ({})", service);
        if !response.ok() {
            // An HTTP-level error is a command failure, not a lane
            // failure; it does not trigger fallback.
            return Ok(self.finish(
                line,
                CommandResult::with_exit_code(
                    String::new(),
                    format!("RPC error: {}\n", response.body),
                    1,
                ),
                Tier::Rpc,
                Handler::Rpc,
                summary,
            ));
        }
        let wire: WireResult = match serde_json::from_str(&response.body) {
            Ok(wire) => wire,
            Err(e) => {
                return Ok(self.finish(
                    line,
                    CommandResult::with_exit_code(
                        String::new(),
                        format!("RPC error: invalid response: {}\n", e),
                        1,
                    ),
                    Tier::Rpc,
                    Handler::Rpc,
                    summary,
                ))
            }
        };
        Ok(self.finish(
            line,
            CommandResult::with_exit_code(wire.stdout, wire.stderr, wire.exit_code),
            Tier::Rpc,
            Handler::Rpc,
            summary,
        ))
    }

    pub(crate) async fn run_polyglot(
        &self,
        line: &str,
        options: &ExecOptions,
        language: &str,
    ) -> Result<ExecutionResult, LaneError> {
        let worker = self.language_workers.get(language).ok_or_else(|| {
            LaneError::Unavailable(format!("no worker registered for language '{}'", language))
        })?;
        let wire = worker
            .execute(line, language, options)
            .await
            .map_err(LaneError::Worker)?;

        if wire.exit_code != 0 && wire.stderr.contains("Network error") && self.sandbox.is_some()
        {
            tracing::warn!(language, "polyglot worker hit a network error, retrying in sandbox");
            return self.run_sandbox(line, options, None, Some(Tier::Rpc)).await;
        }
        Ok(self.finish(
            line,
            CommandResult::with_exit_code(wire.stdout, wire.stderr, wire.exit_code),
            Tier::Rpc,
            Handler::Polyglot,
            format!("Tier 2: Polyglot ({})", language),
        ))
    }

    pub(crate) async fn run_loader(
        &self,
        line: &str,
        _options: &ExecOptions,
    ) -> Result<ExecutionResult, LaneError> {
        let name = tokenizer::command_name(line);
        let binding = self
            .loaders
            .iter()
            .find(|l| l.modules.iter().any(|m| *m == name))
            .or_else(|| self.loaders.first())
            .ok_or_else(|| {
                LaneError::Loader(format!("no loader registered for module '{}'", name))
            })?;
        let module = binding
            .loader
            .load(&name)
            .await
            .map_err(LaneError::Loader)?;
        let entry = module.entry_point().ok_or_else(|| {
            LaneError::Loader(format!(
                "module '{}' has no run/main/default entry point",
                name
            ))
        })?;
        let stdout = entry(tokenizer::argv(line))
            .await
            .map_err(LaneError::Loader)?;
        Ok(self.finish(
            line,
            CommandResult::success(stdout),
            Tier::Loader,
            Handler::Loader,
            format!("Tier 3: Loader ({})", binding.name),
        ))
    }

    pub(crate) async fn run_sandbox(
        &self,
        line: &str,
        options: &ExecOptions,
        strategy: Option<&SandboxStrategy>,
        fallback_from: Option<Tier>,
    ) -> Result<ExecutionResult, LaneError> {
        let binding = self
            .sandbox
            .clone()
            .ok_or_else(|| LaneError::Unavailable("no sandbox binding configured".to_string()))?;
        if let Some(strategy) = strategy {
            tracing::debug!(language = %strategy.language, network = strategy.allow_network, "sandbox strategy attached");
        }
        let mut result = binding
            .execute(line, options)
            .await
            .map_err(LaneError::Sandbox)?;

        result.input = line.to_string();
        result.intent = intent_of(line);
        result.tier = Tier::Sandbox;
        result.handler = Handler::Sandbox;
        result.classification = match fallback_from {
            Some(tier) => format!(
                "Tier 4: Sandbox (container) [fallback from Tier {}]",
                tier.level()
            ),
            None if result.classification.is_empty() => {
                "Tier 4: Sandbox (container)".to_string()
            }
            None => format!("{} (Tier 4: Sandbox)", result.classification),
        };
        Ok(result)
    }

    /// Build the callback native commands use to re-enter the router.
    fn make_exec_fn(&self) -> ExecFn {
        let weak = self.self_ref.clone();
        Arc::new(move |line, stdin, cwd, env| {
            let weak = weak.clone();
            Box::pin(async move {
                let Some(router) = weak.upgrade() else {
                    return CommandResult::error("router is no longer available\n".to_string());
                };
                let options = ExecOptions {
                    cwd: Some(cwd),
                    env: Some(env),
                    stdin: if stdin.is_empty() { None } else { Some(stdin) },
                    timeout_ms: None,
                };
                match router.execute_line(&line, options).await {
                    Ok(result) => {
                        CommandResult::with_exit_code(result.stdout, result.stderr, result.exit_code)
                    }
                    Err(e) => CommandResult::error(format!("{}\n", e)),
                }
            })
        })
    }

    fn finish(
        &self,
        line: &str,
        result: CommandResult,
        tier: Tier,
        handler: Handler,
        classification: String,
    ) -> ExecutionResult {
        ExecutionResult {
            input: line.to_string(),
            stdout: result.stdout,
            stderr: result.stderr,
            exit_code: result.exit_code,
            intent: intent_of(line),
            classification,
            tier,
            handler,
        }
    }

    fn failure(&self, line: &str, stderr: String) -> ExecutionResult {
        ExecutionResult {
            input: line.to_string(),
            stdout: String::new(),
            stderr,
            exit_code: 1,
            intent: intent_of(line),
            classification: "input redirection".to_string(),
            tier: Tier::Native,
            handler: Handler::Native,
        }
    }
}

/// Match `cmd < file` (trailing input redirection only).
fn parse_input_redirect(line: &str) -> Option<(String, String)> {
    let captures = INPUT_REDIRECT_RE.captures(line)?;
    Some((
        captures.get(1)?.as_str().trim().to_string(),
        captures.get(2)?.as_str().to_string(),
    ))
}

/// Audit summary: the command names involved, pipeline-aware.
fn intent_of(line: &str) -> String {
    pipeline::split_pipeline(line)
        .iter()
        .map(|segment| tokenizer::command_name(segment))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// The public router. Cheap to clone; all state lives behind one Arc.
#[derive(Clone)]
pub struct TierRouter {
    inner: Arc<RouterInner>,
}

impl TierRouter {
    pub fn new(options: RouterOptions) -> Self {
        let rpc_list = options.rpc_services.unwrap_or_else(default_rpc_services);
        let mut rpc_bindings = HashMap::new();
        let mut rpc_reverse = HashMap::new();
        for binding in rpc_list {
            for command in &binding.commands {
                rpc_reverse
                    .entry(command.clone())
                    .or_insert_with(|| binding.name.clone());
            }
            rpc_bindings.insert(binding.name.clone(), binding);
        }

        let worker_languages: Vec<String> = options.language_workers.keys().cloned().collect();
        let metrics = Arc::new(MetricsRecorder::new(options.metrics));
        let language_router = options
            .language_router
            .unwrap_or_else(|| Arc::new(DefaultLanguageRouter));
        let safety_analyzer = options
            .safety_analyzer
            .unwrap_or_else(|| Arc::new(BasicSafetyAnalyzer));
        let loader_tables: Vec<(String, Vec<String>)> = options
            .loaders
            .iter()
            .map(|l| (l.name.clone(), l.modules.clone()))
            .collect();

        let classifier = TierClassifier::new(
            options.fs.is_some(),
            rpc_reverse.clone(),
            loader_tables,
            worker_languages,
            language_router,
            safety_analyzer,
            options.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            metrics.clone(),
        );

        let inner = Arc::new_cyclic(|weak| RouterInner {
            self_ref: weak.clone(),
            native: NativeLane::new(),
            fs: options.fs,
            fetch_fn: options.fetch_fn,
            rpc_bindings,
            rpc_reverse,
            loaders: options.loaders,
            language_workers: options.language_workers,
            sandbox: options.sandbox,
            classifier,
            metrics,
        });
        Self { inner }
    }

    /// Execute a command line (single command or pipeline).
    pub async fn execute(
        &self,
        command: &str,
        options: Option<ExecOptions>,
    ) -> Result<ExecutionResult, RouterError> {
        self.inner
            .execute_line(command, options.unwrap_or_default())
            .await
    }

    /// Spawn a streaming process. Only available through a sandbox
    /// binding with spawn support.
    pub async fn spawn(
        &self,
        command: &str,
        args: &[String],
        options: Option<ExecOptions>,
    ) -> Result<Box<dyn SpawnHandle>, RouterError> {
        let Some(sandbox) = &self.inner.sandbox else {
            return Err(RouterError::SpawnUnsupported);
        };
        if !sandbox.supports_spawn() {
            return Err(RouterError::SpawnUnsupported);
        }
        sandbox
            .spawn(command, args, &options.unwrap_or_default())
            .await
            .map_err(RouterError::Spawn)
    }

    pub fn classify_command(&self, command: &str) -> TierClassification {
        self.inner.classify_with_executor(command)
    }

    pub fn get_capabilities(&self) -> CapabilitySnapshot {
        let inner = &self.inner;
        let mut rpc_services: Vec<String> = inner.rpc_bindings.keys().cloned().collect();
        rpc_services.sort();
        let mut polyglot_languages: Vec<String> =
            inner.language_workers.keys().cloned().collect();
        polyglot_languages.sort();
        let mut loadable_modules: Vec<String> = inner
            .loaders
            .iter()
            .flat_map(|l| l.modules.iter().cloned())
            .chain(sets::TIER3_LOADABLE_MODULES.iter().map(|m| m.to_string()))
            .collect();
        loadable_modules.sort();
        loadable_modules.dedup();

        CapabilitySnapshot {
            tier1: Tier1Capabilities {
                available: true,
                fs_available: inner.fs.is_some(),
                command_count: inner.native.command_count(),
                capabilities: inner
                    .native
                    .capabilities()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            },
            tier2: Tier2Capabilities {
                rpc_services,
                polyglot_languages,
            },
            tier3: Tier3Capabilities {
                loaders: inner.loaders.iter().map(|l| l.name.clone()).collect(),
                loadable_modules,
            },
            tier4: Tier4Capabilities {
                sandbox_available: inner.sandbox.is_some(),
                spawn_available: inner
                    .sandbox
                    .as_ref()
                    .map(|s| s.supports_spawn())
                    .unwrap_or(false),
            },
        }
    }

    pub fn is_tier_available(&self, tier: Tier, command: Option<&str>) -> bool {
        let inner = &self.inner;
        match tier {
            Tier::Native => match command {
                Some(line) => {
                    let name = tokenizer::command_name(line);
                    match sets::native_capability(&name) {
                        Some("fs") => inner.fs.is_some(),
                        Some(_) => true,
                        None => name == "npm",
                    }
                }
                None => true,
            },
            Tier::Rpc => match command {
                Some(line) => {
                    let name = tokenizer::command_name(line);
                    inner.rpc_service_for(&name).is_some()
                }
                None => !inner.rpc_bindings.is_empty() || !inner.language_workers.is_empty(),
            },
            Tier::Loader => match command {
                Some(line) => {
                    let name = tokenizer::command_name(line);
                    inner.loader_advertises(&name)
                        || sets::TIER3_LOADABLE_MODULES.contains(name.as_str())
                }
                None => !inner.loaders.is_empty(),
            },
            Tier::Sandbox => inner.sandbox.is_some(),
        }
    }

    pub fn enable_metrics(&self) {
        self.inner.metrics.enable();
    }

    pub fn disable_metrics(&self) {
        self.inner.metrics.disable();
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.inner.metrics.reset();
    }

    pub fn clear_caches(&self) {
        self.inner.classifier.cache().clear();
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.inner.classifier.cache().stats()
    }
}
