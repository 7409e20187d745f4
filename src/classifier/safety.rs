//! Safety analysis for non-bash commands headed to the sandbox.
//!
//! Produces the sandbox strategy attached to tier 4 classifications of
//! foreign-language commands. Synchronous and treated as an oracle.

use crate::types::SandboxStrategy;

pub trait SafetyAnalyzer: Send + Sync {
    fn analyze(&self, command: &str) -> SandboxStrategy;
}

/// Keyword heuristics over the full command content. Conservative
/// defaults: no network, no writes, modest limits.
#[derive(Debug, Default)]
pub struct BasicSafetyAnalyzer;

const NETWORK_MARKERS: &[&str] = &[
    "http://", "https://", "urllib", "requests.", "socket", "fetch(", "net/http", "curl",
];
const WRITE_MARKERS: &[&str] = &[
    "open(", "write", "unlink", "remove", "shutil", "mkdir", "fs.", "File.",
];

impl SafetyAnalyzer for BasicSafetyAnalyzer {
    fn analyze(&self, command: &str) -> SandboxStrategy {
        let language = detect_language(command);
        SandboxStrategy {
            language,
            allow_network: NETWORK_MARKERS.iter().any(|m| command.contains(m)),
            allow_filesystem_write: WRITE_MARKERS.iter().any(|m| command.contains(m)),
            max_memory_mb: Some(256),
            max_runtime_ms: Some(30_000),
        }
    }
}

fn detect_language(command: &str) -> String {
    let name = crate::tokenizer::command_name(command);
    match name.as_str() {
        "python" | "python3" => "python",
        "node" | "nodejs" => "javascript",
        "ruby" => "ruby",
        "perl" => "perl",
        _ => "unknown",
    }
    .to_string()
}
