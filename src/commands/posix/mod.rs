//! Posix-class text and stream utilities.

pub mod cut;
pub mod date_cmd;
pub mod dd;
pub mod od;
pub mod shuf;
pub mod sort_cmd;
pub mod tr;
pub mod uniq;

use async_trait::async_trait;

use super::registry::CommandRegistry;
use super::types::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(BasenameCommand));
    reg.register(Box::new(DirnameCommand));
    reg.register(Box::new(WcCommand));
    reg.register(Box::new(cut::CutCommand));
    reg.register(Box::new(sort_cmd::SortCommand));
    reg.register(Box::new(tr::TrCommand));
    reg.register(Box::new(uniq::UniqCommand));
    reg.register(Box::new(date_cmd::DateCommand));
    reg.register(Box::new(dd::DdCommand));
    reg.register(Box::new(od::OdCommand));
    reg.register(Box::new(shuf::ShufCommand));
}

/// Read the operand content for a command that accepts either stdin or a
/// single file argument.
pub(crate) async fn read_input(
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
                CommandResult::error(format!("{}: {}: No such file or directory\n", command, path))
            })
        }
    }
}

pub struct BasenameCommand;

#[async_trait]
impl Command for BasenameCommand {
    fn name(&self) -> &'static str {
        "basename"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let Some(path) = ctx.args.first() else {
            return CommandResult::error("basename: missing operand\n".to_string());
        };
        let trimmed = path.trim_end_matches('/');
        let mut base = if trimmed.is_empty() {
            "/"
        } else {
            trimmed.rsplit('/').next().unwrap_or(trimmed)
        }
        .to_string();
        if let Some(suffix) = ctx.args.get(1) {
            if base != *suffix {
                base = base
                    .strip_suffix(suffix.as_str())
                    .unwrap_or(&base)
                    .to_string();
            }
        }
        CommandResult::success(format!("{}\n", base))
    }
}

pub struct DirnameCommand;

#[async_trait]
impl Command for DirnameCommand {
    fn name(&self) -> &'static str {
        "dirname"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let Some(path) = ctx.args.first() else {
            return CommandResult::error("dirname: missing operand\n".to_string());
        };
        let trimmed = path.trim_end_matches('/');
        let dir = match trimmed.rfind('/') {
            Some(0) => "/",
            Some(pos) => &trimmed[..pos],
            None => ".",
        };
        let dir = if dir.is_empty() { "/" } else { dir };
        CommandResult::success(format!("{}\n", dir))
    }
}

pub struct WcCommand;

#[async_trait]
impl Command for WcCommand {
    fn name(&self) -> &'static str {
        "wc"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut count_lines = false;
        let mut count_words = false;
        let mut count_bytes = false;
        let mut count_chars = false;
        let mut files: Vec<String> = Vec::new();

        for arg in &ctx.args {
            match arg.as_str() {
                "-l" => count_lines = true,
                "-w" => count_words = true,
                "-c" => count_bytes = true,
                "-m" => count_chars = true,
                "-" => files.push("-".to_string()),
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("wc: invalid option -- '{}'\n", a))
                }
                a => files.push(a.to_string()),
            }
        }
        if !count_lines && !count_words && !count_bytes && !count_chars {
            count_lines = true;
            count_words = true;
            count_bytes = true;
        }

        let inputs: Vec<Option<String>> = if files.is_empty() {
            vec![None]
        } else {
            files.iter().map(|f| Some(f.clone())).collect()
        };

        let mut out = String::new();
        let mut err = String::new();
        let mut totals = (0usize, 0usize, 0usize, 0usize);
        let mut exit_code = 0;
        for input in &inputs {
            let content = match read_input(&ctx, input.as_deref(), "wc").await {
                Ok(c) => c,
                Err(e) => {
                    err.push_str(&e.stderr);
                    exit_code = 1;
                    continue;
                }
            };
            let lines = content.matches('\n').count();
            let words = content.split_whitespace().count();
            let bytes = content.len();
            let chars = content.chars().count();
            totals.0 += lines;
            totals.1 += words;
            totals.2 += bytes;
            totals.3 += chars;

            let mut fields: Vec<String> = Vec::new();
            if count_lines {
                fields.push(lines.to_string());
            }
            if count_words {
                fields.push(words.to_string());
            }
            if count_bytes {
                fields.push(bytes.to_string());
            }
            if count_chars {
                fields.push(chars.to_string());
            }
            if let Some(name) = input {
                if name != "-" {
                    fields.push(name.clone());
                }
            }
            out.push_str(&fields.join(" "));
            out.push('\n');
        }

        if inputs.len() > 1 {
            let mut fields: Vec<String> = Vec::new();
            if count_lines {
                fields.push(totals.0.to_string());
            }
            if count_words {
                fields.push(totals.1.to_string());
            }
            if count_bytes {
                fields.push(totals.2.to_string());
            }
            if count_chars {
                fields.push(totals.3.to_string());
            }
            fields.push("total".to_string());
            out.push_str(&fields.join(" "));
            out.push('\n');
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{ctx, ctx_with_files, ctx_with_stdin};

    #[tokio::test]
    async fn test_basename() {
        let result = BasenameCommand.execute(ctx(vec!["/a/b/c.txt"])).await;
        assert_eq!(result.stdout, "c.txt\n");
        let result = BasenameCommand.execute(ctx(vec!["/a/b/c.txt", ".txt"])).await;
        assert_eq!(result.stdout, "c\n");
        let result = BasenameCommand.execute(ctx(vec!["/a/b/"])).await;
        assert_eq!(result.stdout, "b\n");
        let result = BasenameCommand.execute(ctx(vec!["/"])).await;
        assert_eq!(result.stdout, "/\n");
    }

    #[tokio::test]
    async fn test_dirname() {
        let result = DirnameCommand.execute(ctx(vec!["/a/b/c.txt"])).await;
        assert_eq!(result.stdout, "/a/b\n");
        let result = DirnameCommand.execute(ctx(vec!["plain"])).await;
        assert_eq!(result.stdout, ".\n");
        let result = DirnameCommand.execute(ctx(vec!["/top"])).await;
        assert_eq!(result.stdout, "/\n");
    }

    #[tokio::test]
    async fn test_wc_bytes_from_stdin() {
        let result = WcCommand.execute(ctx_with_stdin(vec!["-c"], "hi")).await;
        assert_eq!(result.stdout, "2\n");
    }

    #[tokio::test]
    async fn test_wc_default_counts() {
        let result = WcCommand
            .execute(ctx_with_stdin(vec![], "one two\nthree\n"))
            .await;
        assert_eq!(result.stdout, "2 3 14\n");
    }

    #[tokio::test]
    async fn test_wc_lines_from_file() {
        let c = ctx_with_files(vec!["-l", "/f.txt"], &[("/f.txt", "a\nb\nc\n")]).await;
        let result = WcCommand.execute(c).await;
        assert_eq!(result.stdout, "3 /f.txt\n");
    }

    #[tokio::test]
    async fn test_wc_multiple_files_total() {
        let c = ctx_with_files(
            vec!["-l", "/a", "/b"],
            &[("/a", "1\n"), ("/b", "1\n2\n")],
        )
        .await;
        let result = WcCommand.execute(c).await;
        assert_eq!(result.stdout, "1 /a\n2 /b\n3 total\n");
    }
}
