use async_trait::async_trait;
use glob::Pattern;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::{FileKind, FsCapability};
use std::sync::Arc;

pub struct FindCommand;

#[derive(Debug, Clone, Default)]
struct FindOptions {
    name_glob: Option<Pattern>,
    type_filter: Option<FileKind>,
}

#[async_trait]
impl Command for FindCommand {
    fn name(&self) -> &'static str {
        "find"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut opts = FindOptions::default();
        let mut roots: Vec<String> = Vec::new();

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-name" => {
                    i += 1;
                    match ctx.args.get(i).map(|g| Pattern::new(g)) {
                        Some(Ok(pattern)) => opts.name_glob = Some(pattern),
                        Some(Err(_)) => {
                            return CommandResult::error("find: invalid pattern\n".to_string())
                        }
                        None => {
                            return CommandResult::error(
                                "find: missing argument to '-name'\n".to_string(),
                            )
                        }
                    }
                }
                "-type" => {
                    i += 1;
                    opts.type_filter = match ctx.args.get(i).map(String::as_str) {
                        Some("f") => Some(FileKind::File),
                        Some("d") => Some(FileKind::Directory),
                        _ => {
                            return CommandResult::error(
                                "find: invalid argument to '-type'\n".to_string(),
                            )
                        }
                    };
                }
                a if a.starts_with('-') => {
                    return CommandResult::error(format!(
                        "find: unknown predicate '{}'\n",
                        a
                    ))
                }
                a => roots.push(a.to_string()),
            }
            i += 1;
        }
        if roots.is_empty() {
            roots.push(".".to_string());
        }

        let fs = match ctx.require_fs("find") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut out = String::new();
        let mut err = String::new();
        let mut exit_code = 0;
        for root in &roots {
            let resolved = ctx.resolve(&fs, root);
            if !fs.exists(&resolved).await {
                err.push_str(&format!(
                    "find: '{}': No such file or directory\n",
                    root
                ));
                exit_code = 1;
                continue;
            }
            walk(&fs, root, &resolved, &opts, &mut out).await;
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}

/// Depth-first pre-order walk; prints `display` paths relative to the root
/// argument the way the real utility does.
async fn walk(
    fs: &Arc<dyn FsCapability>,
    display: &str,
    resolved: &str,
    opts: &FindOptions,
    out: &mut String,
) {
    let mut stack: Vec<(String, String)> = vec![(display.to_string(), resolved.to_string())];
    while let Some((display, resolved)) = stack.pop() {
        let stat = match fs.stat(&resolved).await {
            Ok(s) => s,
            Err(_) => continue,
        };
        if matches(&display, stat.kind, opts) {
            out.push_str(&display);
            out.push('\n');
        }
        if stat.is_directory() {
            if let Ok(entries) = fs.list_entries(&resolved).await {
                // Reverse so the stack pops in sorted order.
                for entry in entries.into_iter().rev() {
                    let child_display = if display.ends_with('/') {
                        format!("{}{}", display, entry.name)
                    } else {
                        format!("{}/{}", display, entry.name)
                    };
                    let child_resolved = if resolved.ends_with('/') {
                        format!("{}{}", resolved, entry.name)
                    } else {
                        format!("{}/{}", resolved, entry.name)
                    };
                    stack.push((child_display, child_resolved));
                }
            }
        }
    }
}

fn matches(path: &str, kind: FileKind, opts: &FindOptions) -> bool {
    if let Some(expected) = opts.type_filter {
        if kind != expected {
            return false;
        }
    }
    if let Some(glob) = &opts.name_glob {
        let basename = path.rsplit('/').next().unwrap_or(path);
        if !glob.matches(basename) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_files;

    #[tokio::test]
    async fn test_find_lists_recursively() {
        let c = ctx_with_files(
            vec!["/d"],
            &[("/d/a.txt", ""), ("/d/sub/b.txt", "")],
        )
        .await;
        let result = FindCommand.execute(c).await;
        assert_eq!(result.stdout, "/d\n/d/a.txt\n/d/sub\n/d/sub/b.txt\n");
    }

    #[tokio::test]
    async fn test_find_name_glob() {
        let c = ctx_with_files(
            vec!["/d", "-name", "*.rs"],
            &[("/d/x.rs", ""), ("/d/y.txt", ""), ("/d/sub/z.rs", "")],
        )
        .await;
        let result = FindCommand.execute(c).await;
        assert_eq!(result.stdout, "/d/sub/z.rs\n/d/x.rs\n");
    }

    #[tokio::test]
    async fn test_find_question_mark_glob() {
        let c = ctx_with_files(
            vec!["/d", "-name", "?.txt"],
            &[("/d/a.txt", ""), ("/d/ab.txt", "")],
        )
        .await;
        let result = FindCommand.execute(c).await;
        assert_eq!(result.stdout, "/d/a.txt\n");
    }

    #[tokio::test]
    async fn test_find_type_filter() {
        let c = ctx_with_files(
            vec!["/d", "-type", "d"],
            &[("/d/f.txt", ""), ("/d/sub/g.txt", "")],
        )
        .await;
        let result = FindCommand.execute(c).await;
        assert_eq!(result.stdout, "/d\n/d/sub\n");
    }

    #[tokio::test]
    async fn test_find_type_and_name() {
        let c = ctx_with_files(
            vec!["/", "-type", "f", "-name", "*.md"],
            &[("/a.md", ""), ("/b.txt", ""), ("/docs/c.md", "")],
        )
        .await;
        let result = FindCommand.execute(c).await;
        assert_eq!(result.stdout, "/a.md\n/docs/c.md\n");
    }

    #[tokio::test]
    async fn test_find_missing_root() {
        let c = ctx_with_files(vec!["/none"], &[]).await;
        let result = FindCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("No such file or directory"));
    }

    #[tokio::test]
    async fn test_find_relative_root() {
        let mut c = ctx_with_files(vec!["docs"], &[("/home/docs/a.txt", "")]).await;
        c.cwd = "/home".to_string();
        let result = FindCommand.execute(c).await;
        assert_eq!(result.stdout, "docs\ndocs/a.txt\n");
    }
}
