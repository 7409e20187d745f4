//! Minimal jq/yq filter engine.
//!
//! The supported filter sub-language is deliberately small: identity (`.`),
//! nested property access (`.a.b`), array indexing (`.items[0]`), `length`,
//! and single pipes such as `.x | length`. Anything else is an error.

use async_trait::async_trait;
use serde_json::Value;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct JqCommand;

#[async_trait]
impl Command for JqCommand {
    fn name(&self) -> &'static str {
        "jq"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let (raw_output, filter, file) = match parse_args(&ctx.args) {
            Ok(parsed) => parsed,
            Err(e) => return CommandResult::error(format!("jq: {}\n", e)),
        };
        let input = match read_source(&ctx, file.as_deref(), "jq").await {
            Ok(c) => c,
            Err(e) => return e,
        };

        let value: Value = match serde_json::from_str(&input) {
            Ok(v) => v,
            Err(e) => return CommandResult::error(format!("jq: parse error: {}\n", e)),
        };
        match apply_filter(&filter, &value) {
            Ok(result) => CommandResult::success(render_json(&result, raw_output)),
            Err(e) => CommandResult::error(format!("jq: error: {}\n", e)),
        }
    }
}

pub struct YqCommand;

#[async_trait]
impl Command for YqCommand {
    fn name(&self) -> &'static str {
        "yq"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let (raw_output, filter, file) = match parse_args(&ctx.args) {
            Ok(parsed) => parsed,
            Err(e) => return CommandResult::error(format!("yq: {}\n", e)),
        };
        let input = match read_source(&ctx, file.as_deref(), "yq").await {
            Ok(c) => c,
            Err(e) => return e,
        };

        let value: Value = match serde_yaml::from_str(&input) {
            Ok(v) => v,
            Err(e) => return CommandResult::error(format!("yq: parse error: {}\n", e)),
        };
        match apply_filter(&filter, &value) {
            Ok(result) => CommandResult::success(render_yaml(&result, raw_output)),
            Err(e) => CommandResult::error(format!("yq: error: {}\n", e)),
        }
    }
}

fn parse_args(args: &[String]) -> Result<(bool, String, Option<String>), String> {
    let mut raw_output = false;
    let mut filter: Option<String> = None;
    let mut file: Option<String> = None;
    for arg in args {
        match arg.as_str() {
            "-r" | "--raw-output" => raw_output = true,
            a if a.starts_with('-') && a != "-" => {
                return Err(format!("unknown option '{}'", a))
            }
            a => {
                if filter.is_none() {
                    filter = Some(a.to_string());
                } else if file.is_none() {
                    file = Some(a.to_string());
                } else {
                    return Err("too many arguments".to_string());
                }
            }
        }
    }
    Ok((raw_output, filter.unwrap_or_else(|| ".".to_string()), file))
}

async fn read_source(
    ctx: &CommandContext,
    file: Option<&str>,
    command: &str,
) -> Result<String, CommandResult> {
    match file {
        None | Some("-") => Ok(ctx.stdin.clone()),
        Some(path) => {
            let fs = ctx.require_fs(command)?;
            let resolved = ctx.resolve(&fs, path);
            fs.read(&resolved).await.map_err(|_| {
                CommandResult::error(format!(
                    "{}: {}: No such file or directory\n",
                    command, path
                ))
            })
        }
    }
}

/// Run a filter: pipe-separated stages, each a path or `length`.
pub fn apply_filter(filter: &str, value: &Value) -> Result<Value, String> {
    let mut current = value.clone();
    for stage in filter.split('|').map(str::trim) {
        current = apply_stage(stage, &current)?;
    }
    Ok(current)
}

fn apply_stage(stage: &str, value: &Value) -> Result<Value, String> {
    if stage.is_empty() {
        return Err("empty filter stage".to_string());
    }
    if stage == "." {
        return Ok(value.clone());
    }
    if stage == "length" {
        return length(value);
    }
    let Some(path) = stage.strip_prefix('.') else {
        return Err(format!("unsupported filter '{}'", stage));
    };

    let mut current = value.clone();
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(format!("unsupported filter '{}'", stage));
        }
        // `name[index]` addresses into an array property.
        let (name, index) = match segment.split_once('[') {
            Some((name, rest)) => {
                let index = rest
                    .strip_suffix(']')
                    .and_then(|i| i.parse::<usize>().ok())
                    .ok_or_else(|| format!("invalid index in '{}'", segment))?;
                (name, Some(index))
            }
            None => (segment, None),
        };
        if !name.is_empty() {
            current = match current.get(name) {
                Some(v) => v.clone(),
                None => Value::Null,
            };
        }
        if let Some(index) = index {
            current = match current.get(index) {
                Some(v) => v.clone(),
                None => Value::Null,
            };
        }
    }
    Ok(current)
}

fn length(value: &Value) -> Result<Value, String> {
    let len = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        Value::Object(o) => o.len(),
        _ => return Err("cannot take length of a number or boolean".to_string()),
    };
    Ok(Value::from(len))
}

fn render_json(value: &Value, raw: bool) -> String {
    match value {
        Value::String(s) if raw => format!("{}\n", s),
        Value::String(s) => format!("{}\n", Value::String(s.clone())),
        other => {
            let rendered =
                serde_json::to_string_pretty(other).unwrap_or_else(|_| "null".to_string());
            format!("{}\n", rendered)
        }
    }
}

fn render_yaml(value: &Value, raw: bool) -> String {
    match value {
        Value::String(s) if raw => format!("{}\n", s),
        other => serde_yaml::to_string(other).unwrap_or_else(|_| "null\n".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_stdin;

    #[tokio::test]
    async fn test_jq_identity() {
        let result = JqCommand
            .execute(ctx_with_stdin(vec!["."], "{\"a\": 1}"))
            .await;
        assert_eq!(result.stdout, "{\n  \"a\": 1\n}\n");
    }

    #[tokio::test]
    async fn test_jq_nested_access() {
        let result = JqCommand
            .execute(ctx_with_stdin(vec![".a.b"], "{\"a\": {\"b\": 42}}"))
            .await;
        assert_eq!(result.stdout, "42\n");
    }

    #[tokio::test]
    async fn test_jq_missing_key_is_null() {
        let result = JqCommand
            .execute(ctx_with_stdin(vec![".nope"], "{}"))
            .await;
        assert_eq!(result.stdout, "null\n");
    }

    #[tokio::test]
    async fn test_jq_array_index() {
        let result = JqCommand
            .execute(ctx_with_stdin(
                vec![".items[1]"],
                "{\"items\": [\"a\", \"b\"]}",
            ))
            .await;
        assert_eq!(result.stdout, "\"b\"\n");
    }

    #[tokio::test]
    async fn test_jq_pipe_length() {
        let result = JqCommand
            .execute(ctx_with_stdin(vec![".x | length"], "{\"x\": [1, 2, 3]}"))
            .await;
        assert_eq!(result.stdout, "3\n");
    }

    #[tokio::test]
    async fn test_jq_raw_output() {
        let result = JqCommand
            .execute(ctx_with_stdin(vec!["-r", ".name"], "{\"name\": \"ana\"}"))
            .await;
        assert_eq!(result.stdout, "ana\n");
        let result = JqCommand
            .execute(ctx_with_stdin(vec![".name"], "{\"name\": \"ana\"}"))
            .await;
        assert_eq!(result.stdout, "\"ana\"\n");
    }

    #[tokio::test]
    async fn test_jq_invalid_json() {
        let result = JqCommand.execute(ctx_with_stdin(vec!["."], "{nope")).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("parse error"));
    }

    #[tokio::test]
    async fn test_jq_unsupported_filter() {
        let result = JqCommand
            .execute(ctx_with_stdin(vec!["map(.x)"], "[]"))
            .await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_yq_scalar_access() {
        let result = YqCommand
            .execute(ctx_with_stdin(vec![".spec.replicas"], "spec:\n  replicas: 3\n"))
            .await;
        assert_eq!(result.stdout, "3\n");
    }

    #[tokio::test]
    async fn test_yq_length() {
        let result = YqCommand
            .execute(ctx_with_stdin(vec![". | length"], "a: 1\nb: 2\n"))
            .await;
        assert_eq!(result.stdout, "2\n");
    }
}
