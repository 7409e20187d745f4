use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;
use std::sync::Arc;

pub struct CpCommand;

#[async_trait]
impl Command for CpCommand {
    fn name(&self) -> &'static str {
        "cp"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut recursive = false;
        let mut paths: Vec<&String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-r" | "-R" | "--recursive" | "-a" => recursive = true,
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("cp: invalid option -- '{}'\n", a))
                }
                _ => paths.push(arg),
            }
        }
        if paths.len() < 2 {
            return CommandResult::error("cp: missing file operand\n".to_string());
        }
        let fs = match ctx.require_fs("cp") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let dest = paths.pop().unwrap();
        let dest_resolved = ctx.resolve(&fs, dest);
        let dest_is_dir = fs
            .stat(&dest_resolved)
            .await
            .map(|s| s.is_directory())
            .unwrap_or(false);
        if paths.len() > 1 && !dest_is_dir {
            return CommandResult::error(format!("cp: target '{}' is not a directory\n", dest));
        }

        for src in paths {
            let src_resolved = ctx.resolve(&fs, src);
            let target = if dest_is_dir {
                format!("{}/{}", dest_resolved, basename(src))
            } else {
                dest_resolved.clone()
            };
            let stat = match fs.stat(&src_resolved).await {
                Ok(s) => s,
                Err(_) => {
                    return CommandResult::error(format!(
                        "cp: cannot stat '{}': No such file or directory\n",
                        src
                    ))
                }
            };
            if stat.is_directory() {
                if !recursive {
                    return CommandResult::error(format!(
                        "cp: -r not specified; omitting directory '{}'\n",
                        src
                    ));
                }
                if let Err(e) = copy_tree(&fs, &src_resolved, &target).await {
                    return CommandResult::error(format!("cp: {}\n", e));
                }
            } else if let Err(e) = fs.copy_file(&src_resolved, &target).await {
                return CommandResult::error(format!("cp: cannot copy '{}': {}\n", src, e));
            }
        }
        CommandResult::success(String::new())
    }
}

pub struct MvCommand;

#[async_trait]
impl Command for MvCommand {
    fn name(&self) -> &'static str {
        "mv"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut paths: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        if paths.len() < 2 {
            return CommandResult::error("mv: missing file operand\n".to_string());
        }
        let fs = match ctx.require_fs("mv") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let dest = paths.pop().unwrap();
        let dest_resolved = ctx.resolve(&fs, dest);
        let dest_is_dir = fs
            .stat(&dest_resolved)
            .await
            .map(|s| s.is_directory())
            .unwrap_or(false);
        if paths.len() > 1 && !dest_is_dir {
            return CommandResult::error(format!("mv: target '{}' is not a directory\n", dest));
        }

        for src in paths {
            let src_resolved = ctx.resolve(&fs, src);
            let target = if dest_is_dir {
                format!("{}/{}", dest_resolved, basename(src))
            } else {
                dest_resolved.clone()
            };
            if let Err(e) = fs.rename(&src_resolved, &target).await {
                return CommandResult::error(format!("mv: cannot move '{}': {}\n", src, e));
            }
        }
        CommandResult::success(String::new())
    }
}

fn basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Copy a directory subtree, iteratively so recursion depth is unbounded.
async fn copy_tree(fs: &Arc<dyn FsCapability>, src: &str, dest: &str) -> Result<(), String> {
    fs.mkdir(dest, true).await.map_err(|e| e.to_string())?;
    let mut stack: Vec<(String, String)> = vec![(src.to_string(), dest.to_string())];
    while let Some((from, to)) = stack.pop() {
        let entries = fs.list_entries(&from).await.map_err(|e| e.to_string())?;
        for entry in entries {
            let child_from = format!("{}/{}", from, entry.name);
            let child_to = format!("{}/{}", to, entry.name);
            if entry.is_directory() {
                fs.mkdir(&child_to, true).await.map_err(|e| e.to_string())?;
                stack.push((child_from, child_to));
            } else {
                fs.copy_file(&child_from, &child_to)
                    .await
                    .map_err(|e| e.to_string())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_files;

    #[tokio::test]
    async fn test_cp_file() {
        let c = ctx_with_files(vec!["/a", "/b"], &[("/a", "data")]).await;
        let fs = c.fs.clone().unwrap();
        let result = CpCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/b").await.unwrap(), "data");
        assert_eq!(fs.read("/a").await.unwrap(), "data");
    }

    #[tokio::test]
    async fn test_cp_into_directory() {
        let c = ctx_with_files(vec!["/a.txt", "/d"], &[("/a.txt", "x"), ("/d/existing", "")]).await;
        let fs = c.fs.clone().unwrap();
        let result = CpCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/d/a.txt").await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_cp_directory_requires_r() {
        let c = ctx_with_files(vec!["/d", "/e"], &[("/d/f", "x")]).await;
        let result = CpCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("-r not specified"));
    }

    #[tokio::test]
    async fn test_cp_recursive() {
        let c = ctx_with_files(vec!["-r", "/d", "/e"], &[("/d/f", "1"), ("/d/sub/g", "2")]).await;
        let fs = c.fs.clone().unwrap();
        let result = CpCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/e/f").await.unwrap(), "1");
        assert_eq!(fs.read("/e/sub/g").await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_cp_missing_source() {
        let c = ctx_with_files(vec!["/none", "/b"], &[]).await;
        let result = CpCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_mv_renames() {
        let c = ctx_with_files(vec!["/a", "/b"], &[("/a", "data")]).await;
        let fs = c.fs.clone().unwrap();
        let result = MvCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/b").await.unwrap(), "data");
        assert!(!fs.exists("/a").await);
    }

    #[tokio::test]
    async fn test_mv_into_directory() {
        let c = ctx_with_files(vec!["/a.txt", "/d"], &[("/a.txt", "x"), ("/d/keep", "")]).await;
        let fs = c.fs.clone().unwrap();
        let result = MvCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/d/a.txt").await.unwrap(), "x");
        assert!(!fs.exists("/a.txt").await);
    }

    #[tokio::test]
    async fn test_mv_directory() {
        let c = ctx_with_files(vec!["/d", "/renamed"], &[("/d/sub/f", "x")]).await;
        let fs = c.fs.clone().unwrap();
        let result = MvCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/renamed/sub/f").await.unwrap(), "x");
    }
}
