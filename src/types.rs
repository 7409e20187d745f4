//! Core data model: tiers, handlers, classifications, execution results.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::executors::LaneExecutor;

/// Execution lane, cheapest first. Tier "1.5" (polyglot) is expressed as
/// `Tier::Rpc` with `Handler::Polyglot`; there is no separate variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Native,
    Rpc,
    Loader,
    Sandbox,
}

impl Tier {
    /// Numeric level, 1 through 4.
    pub fn level(self) -> u8 {
        match self {
            Tier::Native => 1,
            Tier::Rpc => 2,
            Tier::Loader => 3,
            Tier::Sandbox => 4,
        }
    }

    pub fn from_level(level: u8) -> Option<Tier> {
        match level {
            1 => Some(Tier::Native),
            2 => Some(Tier::Rpc),
            3 => Some(Tier::Loader),
            4 => Some(Tier::Sandbox),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

/// Which lane implementation runs a classified command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    Native,
    Rpc,
    Loader,
    Sandbox,
    Polyglot,
}

impl Handler {
    pub fn as_str(self) -> &'static str {
        match self {
            Handler::Native => "native",
            Handler::Rpc => "rpc",
            Handler::Loader => "loader",
            Handler::Sandbox => "sandbox",
            Handler::Polyglot => "polyglot",
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            Handler::Native => "Native",
            Handler::Rpc => "RPC",
            Handler::Loader => "Loader",
            Handler::Sandbox => "Sandbox",
            Handler::Polyglot => "Polyglot",
        }
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Handler {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Resource and access limits for a non-bash command sent to the sandbox,
/// derived by the safety analyzer from the full command content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SandboxStrategy {
    pub language: String,
    pub allow_network: bool,
    pub allow_filesystem_write: bool,
    pub max_memory_mb: Option<u64>,
    pub max_runtime_ms: Option<u64>,
}

/// The decision record for one command line.
#[derive(Clone)]
pub struct TierClassification {
    pub tier: Tier,
    pub handler: Handler,
    /// Short tag driving sub-dispatch inside a lane: a native capability
    /// class (`fs`, `http`, ...), an RPC service name, a loader name, a
    /// language name, or `container`.
    pub capability: String,
    /// Human-readable explanation for observability.
    pub reason: String,
    /// Bound adapter for polymorphic dispatch. Not cached; re-attached on
    /// every classification call.
    pub executor: Option<Arc<dyn LaneExecutor>>,
    /// Present only when a non-bash language was routed to the sandbox lane.
    pub sandbox_strategy: Option<SandboxStrategy>,
}

impl TierClassification {
    pub fn new(
        tier: Tier,
        handler: Handler,
        capability: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            tier,
            handler,
            capability: capability.into(),
            reason: reason.into(),
            executor: None,
            sandbox_strategy: None,
        }
    }

    /// One-line summary, e.g. `Tier 1: Native (compute)`.
    pub fn summary(&self) -> String {
        format!(
            "Tier {}: {} ({})",
            self.tier.level(),
            self.handler.display_name(),
            self.capability
        )
    }
}

impl fmt::Debug for TierClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TierClassification")
            .field("tier", &self.tier)
            .field("handler", &self.handler)
            .field("capability", &self.capability)
            .field("reason", &self.reason)
            .field("executor", &self.executor.as_ref().map(|_| "<bound>"))
            .field("sandbox_strategy", &self.sandbox_strategy)
            .finish()
    }
}

/// Normalized record returned for every executed command line.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The command line as received.
    pub input: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Audit summary of the command names involved, e.g. `echo | wc`.
    pub intent: String,
    /// Human-readable lane summary naming the tier that actually ran.
    pub classification: String,
    pub tier: Tier,
    pub handler: Handler,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl Serialize for ExecutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ExecutionResult", 8)?;
        s.serialize_field("input", &self.input)?;
        s.serialize_field("stdout", &self.stdout)?;
        s.serialize_field("stderr", &self.stderr)?;
        s.serialize_field("exitCode", &self.exit_code)?;
        s.serialize_field("intent", &self.intent)?;
        s.serialize_field("classification", &self.classification)?;
        s.serialize_field("tier", &self.tier)?;
        s.serialize_field("handler", &self.handler)?;
        s.end()
    }
}

/// Per-call execution options.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub cwd: Option<String>,
    pub env: Option<HashMap<String, String>>,
    pub stdin: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_levels() {
        assert_eq!(Tier::Native.level(), 1);
        assert_eq!(Tier::Rpc.level(), 2);
        assert_eq!(Tier::Loader.level(), 3);
        assert_eq!(Tier::Sandbox.level(), 4);
        assert_eq!(Tier::from_level(3), Some(Tier::Loader));
        assert_eq!(Tier::from_level(9), None);
    }

    #[test]
    fn test_handler_strings() {
        assert_eq!(Handler::Native.as_str(), "native");
        assert_eq!(Handler::Polyglot.as_str(), "polyglot");
    }

    #[test]
    fn test_classification_summary() {
        let c = TierClassification::new(Tier::Native, Handler::Native, "compute", "native");
        assert_eq!(c.summary(), "Tier 1: Native (compute)");

        let c = TierClassification::new(Tier::Rpc, Handler::Polyglot, "python", "warm worker");
        assert_eq!(c.summary(), "Tier 2: Polyglot (python)");
    }

    #[test]
    fn test_execution_result_serializes_camel_case() {
        let result = ExecutionResult {
            input: "true".to_string(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            intent: "true".to_string(),
            classification: "Tier 1: Native (compute)".to_string(),
            tier: Tier::Native,
            handler: Handler::Native,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["exitCode"], 0);
        assert_eq!(json["tier"], 1);
        assert_eq!(json["handler"], "native");
    }
}
