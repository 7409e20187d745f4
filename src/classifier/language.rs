//! Language routing.
//!
//! Decides whether a command line is really a foreign-language program
//! (inline interpreter code, a package manager) and where it should run.
//! The classifier treats the router as an oracle; embedders can supply
//! their own.

use crate::tokenizer;

/// Where a detected language should execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// A warm language worker.
    Polyglot,
    /// Full sandbox.
    Sandbox,
}

#[derive(Debug, Clone)]
pub struct LanguageRoute {
    pub language: String,
    pub route_to: RouteTarget,
    /// Set when the line is a package-manager invocation belonging to the
    /// language (e.g. `pip` for python).
    pub package_manager: Option<String>,
}

pub trait LanguageRouter: Send + Sync {
    /// Route a command line, given the languages with registered workers.
    /// `None` means "not a language matter; keep classifying".
    fn route(&self, line: &str, worker_languages: &[String]) -> Option<LanguageRoute>;
}

/// Default heuristics:
/// - interpreter invocations with inline code (`python -c`, `node -e`,
///   `ruby -e`, `perl -e`) are routed by language;
/// - package managers map to their language when a worker for it exists;
/// - a plain `python script.py` is left alone so it can reach the RPC
///   lane.
#[derive(Debug, Default)]
pub struct DefaultLanguageRouter;

impl DefaultLanguageRouter {
    fn interpreter_language(name: &str) -> Option<&'static str> {
        match name {
            "python" | "python3" => Some("python"),
            "node" | "nodejs" => Some("javascript"),
            "ruby" => Some("ruby"),
            "perl" => Some("perl"),
            _ => None,
        }
    }

    fn package_manager_language(name: &str) -> Option<&'static str> {
        match name {
            "pip" | "pip3" => Some("python"),
            "gem" => Some("ruby"),
            "cpan" => Some("perl"),
            _ => None,
        }
    }
}

impl LanguageRouter for DefaultLanguageRouter {
    fn route(&self, line: &str, worker_languages: &[String]) -> Option<LanguageRoute> {
        let name = tokenizer::command_name(line);

        if let Some(language) = Self::interpreter_language(&name) {
            let argv = tokenizer::argv(line);
            let inline_code = argv.iter().any(|a| a == "-c" || a == "-e");
            if inline_code {
                let has_worker = worker_languages.iter().any(|l| l == language);
                return Some(LanguageRoute {
                    language: language.to_string(),
                    route_to: if has_worker {
                        RouteTarget::Polyglot
                    } else {
                        RouteTarget::Sandbox
                    },
                    package_manager: None,
                });
            }
            return None;
        }

        if let Some(language) = Self::package_manager_language(&name) {
            if worker_languages.iter().any(|l| l == language) {
                return Some(LanguageRoute {
                    language: language.to_string(),
                    route_to: RouteTarget::Polyglot,
                    package_manager: Some(name),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(langs: &[&str]) -> Vec<String> {
        langs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inline_python_with_worker() {
        let route = DefaultLanguageRouter
            .route("python -c 'print(1)'", &workers(&["python"]))
            .unwrap();
        assert_eq!(route.language, "python");
        assert_eq!(route.route_to, RouteTarget::Polyglot);
        assert!(route.package_manager.is_none());
    }

    #[test]
    fn test_inline_python_without_worker_goes_to_sandbox() {
        let route = DefaultLanguageRouter
            .route("python3 -c 'print(1)'", &workers(&[]))
            .unwrap();
        assert_eq!(route.route_to, RouteTarget::Sandbox);
    }

    #[test]
    fn test_plain_script_invocation_not_routed() {
        assert!(DefaultLanguageRouter
            .route("python script.py", &workers(&["python"]))
            .is_none());
    }

    #[test]
    fn test_node_inline() {
        let route = DefaultLanguageRouter
            .route("node -e 'console.log(1)'", &workers(&["javascript"]))
            .unwrap();
        assert_eq!(route.language, "javascript");
        assert_eq!(route.route_to, RouteTarget::Polyglot);
    }

    #[test]
    fn test_pip_maps_to_python_worker() {
        let route = DefaultLanguageRouter
            .route("pip install requests", &workers(&["python"]))
            .unwrap();
        assert_eq!(route.language, "python");
        assert_eq!(route.package_manager.as_deref(), Some("pip"));
    }

    #[test]
    fn test_pip_without_worker_not_routed() {
        // Falls through so the pyx RPC service can take it.
        assert!(DefaultLanguageRouter
            .route("pip install requests", &workers(&[]))
            .is_none());
    }

    #[test]
    fn test_unrelated_command_not_routed() {
        assert!(DefaultLanguageRouter
            .route("echo hello", &workers(&["python"]))
            .is_none());
    }
}
