//! Tier classification: map a command line to the cheapest capable lane.

pub mod cache;
pub mod language;
pub mod safety;
pub mod sets;

use std::collections::HashMap;
use std::sync::Arc;

use crate::classifier::cache::{CachedDecision, ClassificationCache};
use crate::classifier::language::{LanguageRouter, RouteTarget};
use crate::classifier::safety::SafetyAnalyzer;
use crate::metrics::MetricsRecorder;
use crate::tokenizer;
use crate::types::{Handler, Tier, TierClassification};

/// Commands whose tier depends on their arguments; cached under the full
/// trimmed line instead of the bare name.
const ARGUMENT_DEPENDENT: &[&str] = &["npm", "python", "python3"];

pub struct TierClassifier {
    fs_available: bool,
    /// command name -> owning RPC service, derived once from the bindings.
    rpc_reverse: HashMap<String, String>,
    /// loader name -> advertised modules.
    loaders: Vec<(String, Vec<String>)>,
    worker_languages: Vec<String>,
    language_router: Arc<dyn LanguageRouter>,
    safety_analyzer: Arc<dyn SafetyAnalyzer>,
    cache: ClassificationCache,
    metrics: Arc<MetricsRecorder>,
}

impl TierClassifier {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fs_available: bool,
        rpc_reverse: HashMap<String, String>,
        loaders: Vec<(String, Vec<String>)>,
        worker_languages: Vec<String>,
        language_router: Arc<dyn LanguageRouter>,
        safety_analyzer: Arc<dyn SafetyAnalyzer>,
        cache_capacity: usize,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            fs_available,
            rpc_reverse,
            loaders,
            worker_languages,
            language_router,
            safety_analyzer,
            cache: ClassificationCache::new(cache_capacity),
            metrics,
        }
    }

    pub fn cache(&self) -> &ClassificationCache {
        &self.cache
    }

    pub fn classify(&self, line: &str) -> TierClassification {
        let name = tokenizer::command_name(line);
        let cache_key = if ARGUMENT_DEPENDENT.contains(&name.as_str()) {
            line.trim().to_string()
        } else {
            name.clone()
        };

        if let Some(hit) = self.cache.get(&cache_key) {
            self.metrics
                .record_classification(hit.tier, hit.handler, Some(true));
            return TierClassification::new(hit.tier, hit.handler, hit.capability, hit.reason);
        }

        let classification = self.decide(line, &name);
        if classification.sandbox_strategy.is_none() {
            // Strategy-bearing decisions depend on full command content
            // and are never cached.
            self.cache.put(
                cache_key,
                CachedDecision {
                    tier: classification.tier,
                    handler: classification.handler,
                    capability: classification.capability.clone(),
                    reason: classification.reason.clone(),
                },
            );
            self.metrics.record_classification(
                classification.tier,
                classification.handler,
                Some(false),
            );
        } else {
            self.metrics
                .record_classification(classification.tier, classification.handler, None);
        }
        classification
    }

    fn decide(&self, line: &str, name: &str) -> TierClassification {
        // Fast path: native command sets.
        if let Some(capability) = sets::native_capability(name) {
            if capability == "fs" && !self.fs_available {
                return TierClassification::new(
                    Tier::Sandbox,
                    Handler::Sandbox,
                    "container",
                    "FsCapability not available",
                );
            }
            return TierClassification::new(
                Tier::Native,
                Handler::Native,
                capability,
                format!("native {} command", capability),
            );
        }

        // Read-only npm operations are served natively.
        if name == "npm" {
            let argv = tokenizer::argv(line);
            let subcommand = argv.iter().find(|a| !a.starts_with('-'));
            if let Some(subcommand) = subcommand {
                if sets::TIER1_NPM_NATIVE_SUBCOMMANDS.contains(subcommand.as_str()) {
                    return TierClassification::new(
                        Tier::Native,
                        Handler::Native,
                        "npm-native",
                        format!("read-only npm {} served natively", subcommand),
                    );
                }
            }
        }

        // Language routing: inline foreign-language code and package
        // managers belonging to a registered worker.
        if let Some(route) = self.language_router.route(line, &self.worker_languages) {
            match route.route_to {
                RouteTarget::Polyglot => {
                    let reason = match &route.package_manager {
                        Some(pm) => format!("{} belongs to the {} worker", pm, route.language),
                        None => format!("warm {} worker available", route.language),
                    };
                    return TierClassification::new(
                        Tier::Rpc,
                        Handler::Polyglot,
                        route.language,
                        reason,
                    );
                }
                RouteTarget::Sandbox => {
                    let mut classification = TierClassification::new(
                        Tier::Sandbox,
                        Handler::Sandbox,
                        "container",
                        format!("no warm worker for {}", route.language),
                    );
                    classification.sandbox_strategy =
                        Some(self.safety_analyzer.analyze(line));
                    return classification;
                }
            }
        }

        // RPC reverse index, O(1) on the hot path.
        if let Some(service) = self.rpc_reverse.get(name) {
            return TierClassification::new(
                Tier::Rpc,
                Handler::Rpc,
                service.clone(),
                format!("routed to {} service", service),
            );
        }

        // Loaders: registered bindings first, then the static set.
        for (loader_name, modules) in &self.loaders {
            if modules.iter().any(|m| m == name) {
                return TierClassification::new(
                    Tier::Loader,
                    Handler::Loader,
                    loader_name.clone(),
                    format!("module available via {} loader", loader_name),
                );
            }
        }
        if sets::TIER3_LOADABLE_MODULES.contains(name) {
            return TierClassification::new(
                Tier::Loader,
                Handler::Loader,
                name,
                "known loadable module",
            );
        }

        // Fallback: full sandbox.
        let reason = if sets::TIER4_SANDBOX_COMMANDS.contains(name) {
            "requires Linux sandbox"
        } else {
            "no higher tier available"
        };
        TierClassification::new(Tier::Sandbox, Handler::Sandbox, "container", reason)
    }
}
