use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct TeeCommand;

#[async_trait]
impl Command for TeeCommand {
    fn name(&self) -> &'static str {
        "tee"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut append = false;
        let mut files: Vec<&String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-a" | "--append" => append = true,
                a if a.starts_with('-') && a.len() > 1 => {
                    return CommandResult::error(format!("tee: invalid option -- '{}'\n", a))
                }
                _ => files.push(arg),
            }
        }

        let mut err = String::new();
        let mut exit_code = 0;
        for file in files {
            let fs = match ctx.require_fs("tee") {
                Ok(fs) => fs,
                Err(e) => return e,
            };
            let resolved = ctx.resolve(&fs, file);
            let payload = if append {
                let existing = fs.read(&resolved).await.unwrap_or_default();
                format!("{}{}", existing, ctx.stdin)
            } else {
                ctx.stdin.clone()
            };
            if let Err(e) = fs.write(&resolved, payload.as_bytes()).await {
                err.push_str(&format!("tee: {}: {}\n", file, e));
                exit_code = 1;
            }
        }
        CommandResult::with_exit_code(ctx.stdin.clone(), err, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{ctx_with_files, ctx_with_stdin};
    use crate::fs::FsCapability;

    #[tokio::test]
    async fn test_tee_passes_stdin_through() {
        let result = TeeCommand.execute(ctx_with_stdin(vec![], "data\n")).await;
        assert_eq!(result.stdout, "data\n");
    }

    #[tokio::test]
    async fn test_tee_writes_file() {
        let mut c = ctx_with_files(vec!["/out.txt"], &[]).await;
        c.stdin = "payload\n".to_string();
        let fs = c.fs.clone().unwrap();
        let result = TeeCommand.execute(c).await;
        assert_eq!(result.stdout, "payload\n");
        assert_eq!(fs.read("/out.txt").await.unwrap(), "payload\n");
    }

    #[tokio::test]
    async fn test_tee_append() {
        let mut c = ctx_with_files(vec!["-a", "/log"], &[("/log", "first\n")]).await;
        c.stdin = "second\n".to_string();
        let fs = c.fs.clone().unwrap();
        TeeCommand.execute(c).await;
        assert_eq!(fs.read("/log").await.unwrap(), "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_tee_multiple_files() {
        let mut c = ctx_with_files(vec!["/a", "/b"], &[]).await;
        c.stdin = "x".to_string();
        let fs = c.fs.clone().unwrap();
        TeeCommand.execute(c).await;
        assert_eq!(fs.read("/a").await.unwrap(), "x");
        assert_eq!(fs.read("/b").await.unwrap(), "x");
    }
}
