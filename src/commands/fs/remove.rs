use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;
use crate::fs::RmOptions;

pub struct RmCommand;

#[async_trait]
impl Command for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut options = RmOptions::default();
        let mut paths: Vec<&String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-r" | "-R" | "--recursive" => options.recursive = true,
                "-f" | "--force" => options.force = true,
                "-rf" | "-fr" => {
                    options.recursive = true;
                    options.force = true;
                }
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("rm: invalid option -- '{}'\n", a))
                }
                _ => paths.push(arg),
            }
        }
        if paths.is_empty() {
            if options.force {
                return CommandResult::success(String::new());
            }
            return CommandResult::error("rm: missing operand\n".to_string());
        }
        let fs = match ctx.require_fs("rm") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut err = String::new();
        let mut exit_code = 0;
        for path in paths {
            let resolved = ctx.resolve(&fs, path);
            if let Err(e) = fs.rm(&resolved, options).await {
                err.push_str(&format!("rm: cannot remove '{}': {}\n", path, e));
                exit_code = 1;
            }
        }
        CommandResult::with_exit_code(String::new(), err, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_files;
    use crate::fs::FsCapability;

    #[tokio::test]
    async fn test_rm_file() {
        let c = ctx_with_files(vec!["/f"], &[("/f", "x")]).await;
        let fs = c.fs.clone().unwrap();
        let result = RmCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert!(!fs.exists("/f").await);
    }

    #[tokio::test]
    async fn test_rm_directory_needs_r() {
        let c = ctx_with_files(vec!["/d"], &[("/d/f", "x")]).await;
        let result = RmCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);

        let c = ctx_with_files(vec!["-r", "/d"], &[("/d/f", "x")]).await;
        let fs = c.fs.clone().unwrap();
        let result = RmCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert!(!fs.exists("/d").await);
    }

    #[tokio::test]
    async fn test_rm_missing_without_force() {
        let c = ctx_with_files(vec!["/none"], &[]).await;
        let result = RmCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_rm_rf_missing_is_quiet() {
        let c = ctx_with_files(vec!["-rf", "/none"], &[]).await;
        let result = RmCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stderr, "");
    }
}
