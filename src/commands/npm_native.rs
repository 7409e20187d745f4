//! Read-only npm operations served in-process from the npm registry.
//!
//! Only the metadata subcommands (`view`/`info`/`show`) and search
//! (`search`/`find`/`s`) live here; anything that mutates state routes to
//! the npm RPC service instead.

use async_trait::async_trait;
use serde_json::Value;

use super::data::jq::apply_filter;
use super::registry::CommandRegistry;
use super::types::{Command, CommandContext, CommandResult};

const REGISTRY_URL: &str = "https://registry.npmjs.org";

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(NpmNativeCommand));
}

pub struct NpmNativeCommand;

#[async_trait]
impl Command for NpmNativeCommand {
    fn name(&self) -> &'static str {
        "npm"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let positional: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        let Some(subcommand) = positional.first() else {
            return CommandResult::error("npm: missing subcommand\n".to_string());
        };
        let Some(fetch_fn) = ctx.fetch_fn.clone() else {
            return CommandResult::error("npm: network capability not available\n".to_string());
        };

        match subcommand.as_str() {
            "view" | "info" | "show" => {
                let Some(package) = positional.get(1) else {
                    return CommandResult::error("npm view: missing package name\n".to_string());
                };
                let url = format!("{}/{}", REGISTRY_URL, package);
                let response = match fetch_fn(
                    url,
                    "GET".to_string(),
                    Default::default(),
                    None,
                )
                .await
                {
                    Ok(r) => r,
                    Err(e) => return CommandResult::error(format!("npm view: {}\n", e)),
                };
                if response.status == 404 {
                    return CommandResult::error(format!(
                        "npm view: package '{}' not found\n",
                        package
                    ));
                }
                if !response.ok() {
                    return CommandResult::error(format!(
                        "npm view: registry returned HTTP {}\n",
                        response.status
                    ));
                }
                let metadata: Value = match serde_json::from_str(&response.body) {
                    Ok(v) => v,
                    Err(e) => {
                        return CommandResult::error(format!(
                            "npm view: invalid registry response: {}\n",
                            e
                        ))
                    }
                };

                match positional.get(2) {
                    Some(field) => {
                        let filter = format!(".{}", field);
                        match apply_filter(&filter, &metadata) {
                            Ok(Value::String(s)) => CommandResult::success(format!("{}\n", s)),
                            Ok(value) => CommandResult::success(format!("{}\n", value)),
                            Err(e) => CommandResult::error(format!("npm view: {}\n", e)),
                        }
                    }
                    None => CommandResult::success(render_summary(package, &metadata)),
                }
            }
            "search" | "find" | "s" => {
                let Some(text) = positional.get(1) else {
                    return CommandResult::error("npm search: missing search text\n".to_string());
                };
                let url = format!("{}/-/v1/search?text={}&size=10", REGISTRY_URL, text);
                let response = match fetch_fn(
                    url,
                    "GET".to_string(),
                    Default::default(),
                    None,
                )
                .await
                {
                    Ok(r) => r,
                    Err(e) => return CommandResult::error(format!("npm search: {}\n", e)),
                };
                if !response.ok() {
                    return CommandResult::error(format!(
                        "npm search: registry returned HTTP {}\n",
                        response.status
                    ));
                }
                let results: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
                let mut out = String::new();
                if let Some(objects) = results.get("objects").and_then(Value::as_array) {
                    for object in objects {
                        let package = &object["package"];
                        out.push_str(&format!(
                            "{} - {}\n",
                            package["name"].as_str().unwrap_or("?"),
                            package["description"].as_str().unwrap_or(""),
                        ));
                    }
                }
                CommandResult::success(out)
            }
            other => CommandResult::error(format!(
                "npm: subcommand '{}' is not served natively\n",
                other
            )),
        }
    }
}

fn render_summary(package: &str, metadata: &Value) -> String {
    let latest = metadata["dist-tags"]["latest"].as_str().unwrap_or("unknown");
    let description = metadata["description"].as_str().unwrap_or("");
    let license = metadata["license"].as_str().unwrap_or("unknown");
    let versions = metadata["versions"]
        .as_object()
        .map(|v| v.len())
        .unwrap_or(0);
    format!(
        "{}@{}\n{}\nlicense: {}\nversions: {}\n",
        package, latest, description, license, versions
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    use super::*;
    use crate::commands::types::test_support::ctx;
    use crate::commands::types::{FetchFn, FetchResponse};

    fn registry_fetch(status: u16, body: &str) -> FetchFn {
        let body = body.to_string();
        Arc::new(move |url: String, _m, _h: HashMap<String, String>, _b| {
            let body = body.clone();
            Box::pin(async move {
                Ok(FetchResponse {
                    status,
                    headers: HashMap::new(),
                    body,
                    url,
                })
            }) as Pin<Box<dyn Future<Output = Result<FetchResponse, String>> + Send>>
        })
    }

    const LODASH: &str = r#"{
        "name": "lodash",
        "description": "Lodash modular utilities.",
        "license": "MIT",
        "dist-tags": {"latest": "4.17.21"},
        "versions": {"4.17.20": {}, "4.17.21": {}}
    }"#;

    #[tokio::test]
    async fn test_npm_view_summary() {
        let mut c = ctx(vec!["view", "lodash"]);
        c.fetch_fn = Some(registry_fetch(200, LODASH));
        let result = NpmNativeCommand.execute(c).await;
        assert!(result.stdout.contains("lodash@4.17.21"));
        assert!(result.stdout.contains("license: MIT"));
        assert!(result.stdout.contains("versions: 2"));
    }

    #[tokio::test]
    async fn test_npm_view_field() {
        let mut c = ctx(vec!["view", "lodash", "dist-tags.latest"]);
        c.fetch_fn = Some(registry_fetch(200, LODASH));
        let result = NpmNativeCommand.execute(c).await;
        assert_eq!(result.stdout, "4.17.21\n");
    }

    #[tokio::test]
    async fn test_npm_view_missing_package() {
        let mut c = ctx(vec!["view", "no-such-package-xyz"]);
        c.fetch_fn = Some(registry_fetch(404, "{}"));
        let result = NpmNativeCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("not found"));
    }

    #[tokio::test]
    async fn test_npm_search() {
        let body = r#"{"objects": [
            {"package": {"name": "left-pad", "description": "pads left"}},
            {"package": {"name": "right-pad", "description": "pads right"}}
        ]}"#;
        let mut c = ctx(vec!["search", "pad"]);
        c.fetch_fn = Some(registry_fetch(200, body));
        let result = NpmNativeCommand.execute(c).await;
        assert_eq!(result.stdout, "left-pad - pads left\nright-pad - pads right\n");
    }

    #[tokio::test]
    async fn test_npm_mutating_subcommand_rejected() {
        let mut c = ctx(vec!["install", "lodash"]);
        c.fetch_fn = Some(registry_fetch(200, "{}"));
        let result = NpmNativeCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("not served natively"));
    }

    #[tokio::test]
    async fn test_npm_without_network() {
        let result = NpmNativeCommand.execute(ctx(vec!["view", "lodash"])).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("network capability"));
    }
}
