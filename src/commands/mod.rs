//! Native command library (Tier 1).
//!
//! Commands are grouped by capability class; the class tag on a
//! classification selects the sub-registry, the command name selects the
//! implementation. Every command satisfies the same contract: take
//! (argv, stdin, env, cwd, collaborators), return `{stdout, stderr,
//! exit_code}`, never panic, never throw for command-semantic failures.

pub mod compute;
pub mod crypto;
pub mod data;
pub mod extended;
pub mod fs;
pub mod http;
pub mod npm_native;
pub mod posix;
pub mod registry;
pub mod system;
pub mod text;
pub mod types;

pub use registry::CommandRegistry;
pub use types::{Command, CommandContext, CommandResult, ExecFn, FetchFn, FetchResponse};

/// The Tier 1 lane: one registry per capability class.
pub struct NativeLane {
    classes: Vec<(&'static str, CommandRegistry)>,
}

impl NativeLane {
    pub fn new() -> Self {
        let build = |f: fn(&mut CommandRegistry)| {
            let mut reg = CommandRegistry::new();
            f(&mut reg);
            reg
        };
        Self {
            classes: vec![
                ("fs", build(fs::register)),
                ("http", build(http::register)),
                ("data", build(data::register)),
                ("crypto", build(crypto::register)),
                ("text", build(text::register)),
                ("posix", build(posix::register)),
                ("system", build(system::register)),
                ("extended", build(extended::register)),
                ("compute", build(compute::register)),
                ("npm-native", build(npm_native::register)),
            ],
        }
    }

    pub fn class(&self, capability: &str) -> Option<&CommandRegistry> {
        self.classes
            .iter()
            .find(|(tag, _)| *tag == capability)
            .map(|(_, reg)| reg)
    }

    pub fn get(&self, capability: &str, name: &str) -> Option<&dyn Command> {
        self.class(capability).and_then(|reg| reg.get(name))
    }

    pub fn capabilities(&self) -> Vec<&'static str> {
        self.classes.iter().map(|(tag, _)| *tag).collect()
    }

    pub fn command_count(&self) -> usize {
        self.classes.iter().map(|(_, reg)| reg.len()).sum()
    }
}

impl Default for NativeLane {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::sets;

    #[test]
    fn test_every_class_has_commands() {
        let lane = NativeLane::new();
        for (tag, reg) in &lane.classes {
            assert!(!reg.is_empty(), "class {} is empty", tag);
        }
    }

    #[test]
    fn test_registries_match_classification_sets() {
        // The classifier's static sets and the lane registries must never
        // drift: every classified name must be executable and vice versa.
        let lane = NativeLane::new();
        for (tag, set) in [
            ("fs", &*sets::TIER1_FS_COMMANDS),
            ("http", &*sets::TIER1_HTTP_COMMANDS),
            ("data", &*sets::TIER1_DATA_COMMANDS),
            ("crypto", &*sets::TIER1_CRYPTO_COMMANDS),
            ("text", &*sets::TIER1_TEXT_COMMANDS),
            ("posix", &*sets::TIER1_POSIX_COMMANDS),
            ("system", &*sets::TIER1_SYSTEM_COMMANDS),
            ("extended", &*sets::TIER1_EXTENDED_COMMANDS),
            ("compute", &*sets::TIER1_COMPUTE_COMMANDS),
        ] {
            let reg = lane.class(tag).unwrap();
            // `[` is a registry alias for `test`, invisible to the
            // classifier's name grammar.
            let mut registered: Vec<&str> =
                reg.names().into_iter().filter(|n| *n != "[").collect();
            registered.sort_unstable();
            let mut listed: Vec<&str> = set.iter().copied().collect();
            listed.sort_unstable();
            assert_eq!(registered, listed, "class {} drifted", tag);
        }
    }

    #[test]
    fn test_lookup_by_capability() {
        let lane = NativeLane::new();
        assert!(lane.get("compute", "echo").is_some());
        assert!(lane.get("fs", "cat").is_some());
        assert!(lane.get("compute", "cat").is_none());
        assert!(lane.get("npm-native", "npm").is_some());
    }
}
