use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;
use crate::fs::FileKind;

pub struct StatCommand;

#[async_trait]
impl Command for StatCommand {
    fn name(&self) -> &'static str {
        "stat"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let files: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        if files.is_empty() {
            return CommandResult::error("stat: missing operand\n".to_string());
        }
        let fs = match ctx.require_fs("stat") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut out = String::new();
        let mut err = String::new();
        let mut exit_code = 0;
        for file in files {
            let resolved = ctx.resolve(&fs, file);
            match fs.lstat(&resolved).await {
                Ok(stat) => {
                    let kind = match stat.kind {
                        FileKind::File => "regular file",
                        FileKind::Directory => "directory",
                        FileKind::Symlink => "symbolic link",
                    };
                    out.push_str(&format!(
                        "  File: {}\n  Size: {}\n  Type: {}\nAccess: ({:04o})  Uid: {}  Gid: {}\n",
                        file, stat.size, kind, stat.mode, stat.uid, stat.gid
                    ));
                }
                Err(_) => {
                    err.push_str(&format!(
                        "stat: cannot statx '{}': No such file or directory\n",
                        file
                    ));
                    exit_code = 1;
                }
            }
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}

pub struct ReadlinkCommand;

#[async_trait]
impl Command for ReadlinkCommand {
    fn name(&self) -> &'static str {
        "readlink"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let path = match ctx.args.iter().find(|a| !a.starts_with('-')) {
            Some(p) => p,
            None => return CommandResult::error("readlink: missing operand\n".to_string()),
        };
        let fs = match ctx.require_fs("readlink") {
            Ok(fs) => fs,
            Err(e) => return e,
        };
        let resolved = ctx.resolve(&fs, path);
        match fs.readlink(&resolved).await {
            Ok(target) => CommandResult::success(format!("{}\n", target)),
            Err(_) => CommandResult::with_exit_code(String::new(), String::new(), 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_files;
    use crate::fs::FsCapability;

    #[tokio::test]
    async fn test_stat_file() {
        let c = ctx_with_files(vec!["/a.txt"], &[("/a.txt", "hello")]).await;
        let result = StatCommand.execute(c).await;
        assert!(result.stdout.contains("File: /a.txt"));
        assert!(result.stdout.contains("Size: 5"));
        assert!(result.stdout.contains("regular file"));
        assert!(result.stdout.contains("(0644)"));
    }

    #[tokio::test]
    async fn test_stat_directory() {
        let c = ctx_with_files(vec!["/d"], &[("/d/x", "")]).await;
        let result = StatCommand.execute(c).await;
        assert!(result.stdout.contains("directory"));
    }

    #[tokio::test]
    async fn test_stat_missing() {
        let c = ctx_with_files(vec!["/none"], &[]).await;
        let result = StatCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("cannot statx"));
    }

    #[tokio::test]
    async fn test_readlink_prints_target() {
        let c = ctx_with_files(vec!["/link"], &[("/real", "x")]).await;
        c.fs.as_ref().unwrap().symlink("/real", "/link").await.unwrap();
        let result = ReadlinkCommand.execute(c).await;
        assert_eq!(result.stdout, "/real\n");
    }

    #[tokio::test]
    async fn test_readlink_non_symlink_fails_quietly() {
        let c = ctx_with_files(vec!["/plain"], &[("/plain", "x")]).await;
        let result = ReadlinkCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stdout, "");
    }
}
