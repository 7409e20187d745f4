use std::time::SystemTime;

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct TouchCommand;

#[async_trait]
impl Command for TouchCommand {
    fn name(&self) -> &'static str {
        "touch"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let paths: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        if paths.is_empty() {
            return CommandResult::error("touch: missing file operand\n".to_string());
        }
        let fs = match ctx.require_fs("touch") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let now = SystemTime::now();
        let mut err = String::new();
        let mut exit_code = 0;
        for path in paths {
            let resolved = ctx.resolve(&fs, path);
            // Bump times on an existing file; create it otherwise.
            if fs.utimes(&resolved, now, now).await.is_err() {
                if let Err(e) = fs.write(&resolved, b"").await {
                    err.push_str(&format!("touch: cannot touch '{}': {}\n", path, e));
                    exit_code = 1;
                }
            }
        }
        CommandResult::with_exit_code(String::new(), err, exit_code)
    }
}

pub struct TruncateCommand;

#[async_trait]
impl Command for TruncateCommand {
    fn name(&self) -> &'static str {
        "truncate"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut size: Option<u64> = None;
        let mut paths: Vec<&String> = Vec::new();
        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            if arg == "-s" {
                i += 1;
                size = ctx.args.get(i).and_then(|n| n.parse().ok());
                if size.is_none() {
                    return CommandResult::error("truncate: invalid size\n".to_string());
                }
            } else if let Some(spec) = arg.strip_prefix("-s") {
                size = spec.parse().ok();
                if size.is_none() {
                    return CommandResult::error("truncate: invalid size\n".to_string());
                }
            } else if arg.starts_with('-') {
                return CommandResult::error(format!("truncate: invalid option -- '{}'\n", arg));
            } else {
                paths.push(arg);
            }
            i += 1;
        }

        let Some(size) = size else {
            return CommandResult::error("truncate: you must specify '-s'\n".to_string());
        };
        if paths.is_empty() {
            return CommandResult::error("truncate: missing file operand\n".to_string());
        }
        let fs = match ctx.require_fs("truncate") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut err = String::new();
        let mut exit_code = 0;
        for path in paths {
            let resolved = ctx.resolve(&fs, path);
            if !fs.exists(&resolved).await {
                // truncate creates missing files, like the real utility.
                if let Err(e) = fs.write(&resolved, b"").await {
                    err.push_str(&format!("truncate: cannot open '{}': {}\n", path, e));
                    exit_code = 1;
                    continue;
                }
            }
            if let Err(e) = fs.truncate(&resolved, size).await {
                err.push_str(&format!("truncate: cannot truncate '{}': {}\n", path, e));
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
    async fn test_touch_creates_empty_file() {
        let c = ctx_with_files(vec!["/new.txt"], &[]).await;
        let fs = c.fs.clone().unwrap();
        let result = TouchCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/new.txt").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_touch_preserves_existing_content() {
        let c = ctx_with_files(vec!["/f"], &[("/f", "keep")]).await;
        let fs = c.fs.clone().unwrap();
        let result = TouchCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/f").await.unwrap(), "keep");
    }

    #[tokio::test]
    async fn test_touch_updates_mtime() {
        let c = ctx_with_files(vec!["/f"], &[("/f", "x")]).await;
        let fs = c.fs.clone().unwrap();
        let before = fs.stat("/f").await.unwrap().mtime;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        TouchCommand.execute(c).await;
        let after = fs.stat("/f").await.unwrap().mtime;
        assert!(after >= before);
    }

    #[tokio::test]
    async fn test_truncate_shrinks() {
        let c = ctx_with_files(vec!["-s", "3", "/f"], &[("/f", "abcdef")]).await;
        let fs = c.fs.clone().unwrap();
        let result = TruncateCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/f").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_truncate_creates_and_extends() {
        let c = ctx_with_files(vec!["-s", "4", "/new"], &[]).await;
        let fs = c.fs.clone().unwrap();
        let result = TruncateCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read_bytes("/new").await.unwrap(), b"\0\0\0\0");
    }

    #[tokio::test]
    async fn test_truncate_requires_size() {
        let c = ctx_with_files(vec!["/f"], &[("/f", "x")]).await;
        let result = TruncateCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
    }
}
