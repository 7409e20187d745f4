//! awk, restricted to `{print ...}` programs over `$N` fields. Any other
//! program passes the input through unchanged.

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct AwkCommand;

#[async_trait]
impl Command for AwkCommand {
    fn name(&self) -> &'static str {
        "awk"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut separator: Option<String> = None;
        let mut program: Option<String> = None;
        let mut file: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            if arg == "-F" {
                i += 1;
                match ctx.args.get(i) {
                    Some(sep) => separator = Some(sep.clone()),
                    None => {
                        return CommandResult::error(
                            "awk: option requires an argument -- 'F'\n".to_string(),
                        )
                    }
                }
            } else if let Some(sep) = arg.strip_prefix("-F") {
                separator = Some(sep.to_string());
            } else if arg.starts_with('-') && arg.len() > 1 {
                return CommandResult::error(format!("awk: invalid option -- '{}'\n", arg));
            } else if program.is_none() {
                program = Some(arg.clone());
            } else {
                file = Some(arg.clone());
            }
            i += 1;
        }

        let Some(program) = program else {
            return CommandResult::with_exit_code(
                String::new(),
                "awk: no program given\n".to_string(),
                2,
            );
        };

        let content = match file.as_deref() {
            None | Some("-") => ctx.stdin.clone(),
            Some(path) => {
                let fs = match ctx.require_fs("awk") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, path);
                match fs.read(&resolved).await {
                    Ok(c) => c,
                    Err(_) => {
                        return CommandResult::with_exit_code(
                            String::new(),
                            format!("awk: can't open file {}\n", path),
                            2,
                        )
                    }
                }
            }
        };

        let Some(columns) = parse_print_program(&program) else {
            // Out-of-subset programs pass the input through.
            return CommandResult::success(content);
        };

        let mut out = String::new();
        for line in content.lines() {
            let fields: Vec<&str> = match &separator {
                Some(sep) => line.split(sep.as_str()).collect(),
                None => line.split_whitespace().collect(),
            };
            let rendered: Vec<&str> = columns
                .iter()
                .map(|&n| {
                    if n == 0 {
                        line
                    } else {
                        fields.get(n - 1).copied().unwrap_or("")
                    }
                })
                .collect();
            out.push_str(&rendered.join(" "));
            out.push('\n');
        }
        CommandResult::success(out)
    }
}

/// Accepts `{print}`, `{print $0}`, `{print $2}`, `{print $1, $3}`.
/// Returns the selected field numbers, 0 meaning the whole line.
fn parse_print_program(program: &str) -> Option<Vec<usize>> {
    let body = program.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
    let rest = body.strip_prefix("print")?.trim();
    if rest.is_empty() {
        return Some(vec![0]);
    }
    let mut columns = Vec::new();
    for piece in rest.split(',') {
        let field = piece.trim().strip_prefix('$')?;
        columns.push(field.parse::<usize>().ok()?);
    }
    Some(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_stdin;

    #[tokio::test]
    async fn test_awk_single_field() {
        let result = AwkCommand
            .execute(ctx_with_stdin(vec!["{print $2}"], "a b c\nd e f\n"))
            .await;
        assert_eq!(result.stdout, "b\ne\n");
    }

    #[tokio::test]
    async fn test_awk_multiple_fields() {
        let result = AwkCommand
            .execute(ctx_with_stdin(vec!["{print $1, $3}"], "a b c\n"))
            .await;
        assert_eq!(result.stdout, "a c\n");
    }

    #[tokio::test]
    async fn test_awk_whole_line() {
        let result = AwkCommand
            .execute(ctx_with_stdin(vec!["{print}"], "keep me\n"))
            .await;
        assert_eq!(result.stdout, "keep me\n");
        let result = AwkCommand
            .execute(ctx_with_stdin(vec!["{print $0}"], "keep me\n"))
            .await;
        assert_eq!(result.stdout, "keep me\n");
    }

    #[tokio::test]
    async fn test_awk_custom_separator() {
        let result = AwkCommand
            .execute(ctx_with_stdin(vec!["-F", ":", "{print $1}"], "root:x:0\n"))
            .await;
        assert_eq!(result.stdout, "root\n");
    }

    #[tokio::test]
    async fn test_awk_missing_field_is_empty() {
        let result = AwkCommand
            .execute(ctx_with_stdin(vec!["{print $5}"], "a b\n"))
            .await;
        assert_eq!(result.stdout, "\n");
    }

    #[tokio::test]
    async fn test_awk_complex_program_passes_through() {
        let result = AwkCommand
            .execute(ctx_with_stdin(
                vec!["BEGIN { x = 0 } { x += $1 }"],
                "1\n2\n",
            ))
            .await;
        assert_eq!(result.stdout, "1\n2\n");
    }

    #[tokio::test]
    async fn test_awk_no_program() {
        let result = AwkCommand.execute(ctx_with_stdin(vec![], "x\n")).await;
        assert_eq!(result.exit_code, 2);
    }
}
