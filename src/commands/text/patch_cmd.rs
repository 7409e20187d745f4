//! patch: apply a unified diff read from stdin to files on the
//! filesystem capability. Supports `-R`, `--dry-run`, and `-pN` strip
//! levels.

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct PatchCommand;

#[derive(Debug, Clone)]
struct Hunk {
    old_start: usize,
    new_start: usize,
    lines: Vec<(char, String)>,
}

#[derive(Debug, Clone)]
struct FilePatch {
    old_path: String,
    new_path: String,
    hunks: Vec<Hunk>,
}

#[async_trait]
impl Command for PatchCommand {
    fn name(&self) -> &'static str {
        "patch"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut reverse = false;
        let mut dry_run = false;
        let mut strip: usize = 0;
        let mut explicit_target: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-R" | "--reverse" => reverse = true,
                "--dry-run" => dry_run = true,
                "-p" => {
                    i += 1;
                    strip = ctx.args.get(i).and_then(|n| n.parse().ok()).unwrap_or(0);
                }
                a if a.starts_with("-p") => {
                    strip = a[2..].parse().unwrap_or(0);
                }
                "-i" => {
                    // patch file operand is unsupported without fs stdin;
                    // accepted but the diff still comes from stdin.
                    i += 1;
                }
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("patch: invalid option -- '{}'\n", a))
                }
                a => explicit_target = Some(a.to_string()),
            }
            i += 1;
        }

        let patches = match parse_unified(&ctx.stdin) {
            Ok(p) if p.is_empty() => {
                return CommandResult::error("patch: no valid patch found in input\n".to_string())
            }
            Ok(p) => p,
            Err(e) => return CommandResult::error(format!("patch: {}\n", e)),
        };

        let fs = match ctx.require_fs("patch") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut out = String::new();
        for patch in &patches {
            let source_path = if reverse {
                &patch.new_path
            } else {
                &patch.old_path
            };
            let target = explicit_target
                .clone()
                .unwrap_or_else(|| strip_components(source_path, strip));
            let resolved = ctx.resolve(&fs, &target);
            let original = fs.read(&resolved).await.unwrap_or_default();

            match apply_patch(&original, &patch.hunks, reverse) {
                Ok(updated) => {
                    out.push_str(&format!("patching file {}\n", target));
                    if !dry_run {
                        if let Err(e) = fs.write(&resolved, updated.as_bytes()).await {
                            return CommandResult::error(format!(
                                "patch: cannot write {}: {}\n",
                                target, e
                            ));
                        }
                    }
                }
                Err(e) => {
                    return CommandResult::with_exit_code(
                        out,
                        format!("patch: {}: {}\n", target, e),
                        1,
                    )
                }
            }
        }
        CommandResult::success(out)
    }
}

fn strip_components(path: &str, strip: usize) -> String {
    let mut parts: Vec<&str> = path.split('/').collect();
    if strip > 0 && parts.len() > strip {
        parts.drain(..strip);
    }
    parts.join("/")
}

fn parse_unified(input: &str) -> Result<Vec<FilePatch>, String> {
    let mut patches: Vec<FilePatch> = Vec::new();
    let mut lines = input.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(old_path) = line.strip_prefix("--- ") else {
            continue;
        };
        let Some(new_line) = lines.next() else {
            return Err("truncated patch header".to_string());
        };
        let Some(new_path) = new_line.strip_prefix("+++ ") else {
            return Err("malformed patch header".to_string());
        };

        let clean = |p: &str| {
            p.split_whitespace()
                .next()
                .unwrap_or(p)
                .to_string()
        };
        let mut patch = FilePatch {
            old_path: clean(old_path),
            new_path: clean(new_path),
            hunks: Vec::new(),
        };

        while let Some(&candidate) = lines.peek() {
            let Some(header) = candidate.strip_prefix("@@ ") else {
                break;
            };
            lines.next();
            let (old_start, new_start) = parse_hunk_header(header)?;
            let mut hunk = Hunk {
                old_start,
                new_start,
                lines: Vec::new(),
            };
            while let Some(&body) = lines.peek() {
                match body.chars().next() {
                    Some(' ') | Some('+') | Some('-') => {
                        let tag = body.chars().next().unwrap();
                        hunk.lines.push((tag, body[1..].to_string()));
                        lines.next();
                    }
                    Some('\\') => {
                        // "\ No newline at end of file"
                        lines.next();
                    }
                    _ => break,
                }
            }
            patch.hunks.push(hunk);
        }
        patches.push(patch);
    }
    Ok(patches)
}

/// Parse `-l,n +l,m @@`.
fn parse_hunk_header(header: &str) -> Result<(usize, usize), String> {
    let header = header.trim_end_matches(" @@");
    let mut old_start = 0;
    let mut new_start = 0;
    for part in header.split_whitespace() {
        let (sign, rest) = part.split_at(1);
        let number = rest.split(',').next().unwrap_or("0");
        let value: usize = number
            .parse()
            .map_err(|_| format!("malformed hunk header '@@ {} @@'", header))?;
        match sign {
            "-" => old_start = value,
            "+" => new_start = value,
            _ => {}
        }
    }
    Ok((old_start, new_start))
}

fn apply_patch(original: &str, hunks: &[Hunk], reverse: bool) -> Result<String, String> {
    let mut lines: Vec<String> = original.lines().map(String::from).collect();
    // Apply from the bottom up so earlier hunks keep their line numbers.
    for hunk in hunks.iter().rev() {
        let (remove_tag, insert_tag) = if reverse { ('+', '-') } else { ('-', '+') };
        let start = if reverse {
            hunk.new_start
        } else {
            hunk.old_start
        }
        .saturating_sub(1);

        let expected: Vec<&str> = hunk
            .lines
            .iter()
            .filter(|(tag, _)| *tag == ' ' || *tag == remove_tag)
            .map(|(_, text)| text.as_str())
            .collect();
        let replacement: Vec<String> = hunk
            .lines
            .iter()
            .filter(|(tag, _)| *tag == ' ' || *tag == insert_tag)
            .map(|(_, text)| text.clone())
            .collect();

        let actual: Vec<&str> = lines
            .iter()
            .skip(start)
            .take(expected.len())
            .map(String::as_str)
            .collect();
        if actual != expected {
            return Err("hunk failed to apply".to_string());
        }
        lines.splice(start..start + expected.len(), replacement);
    }
    let mut out = lines.join("\n");
    if original.ends_with('\n') || original.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_files;

    const PATCH: &str = "--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,3 @@\n one\n-two\n+TWO\n three\n";

    #[tokio::test]
    async fn test_patch_applies() {
        let mut c = ctx_with_files(vec!["-p1"], &[("/f.txt", "one\ntwo\nthree\n")]).await;
        c.stdin = PATCH.to_string();
        let fs = c.fs.clone().unwrap();
        let result = PatchCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("patching file f.txt"));
        assert_eq!(fs.read("/f.txt").await.unwrap(), "one\nTWO\nthree\n");
    }

    #[tokio::test]
    async fn test_patch_reverse() {
        let mut c = ctx_with_files(vec!["-p1", "-R"], &[("/f.txt", "one\nTWO\nthree\n")]).await;
        c.stdin = PATCH.to_string();
        let fs = c.fs.clone().unwrap();
        let result = PatchCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/f.txt").await.unwrap(), "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_patch_dry_run_leaves_file() {
        let mut c =
            ctx_with_files(vec!["-p1", "--dry-run"], &[("/f.txt", "one\ntwo\nthree\n")]).await;
        c.stdin = PATCH.to_string();
        let fs = c.fs.clone().unwrap();
        let result = PatchCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/f.txt").await.unwrap(), "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_patch_context_mismatch_fails() {
        let mut c = ctx_with_files(vec!["-p1"], &[("/f.txt", "different\ncontent\n")]).await;
        c.stdin = PATCH.to_string();
        let result = PatchCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("hunk failed to apply"));
    }

    #[tokio::test]
    async fn test_patch_explicit_target() {
        let mut c = ctx_with_files(vec!["/other.txt"], &[("/other.txt", "one\ntwo\nthree\n")]).await;
        c.stdin = PATCH.to_string();
        let fs = c.fs.clone().unwrap();
        let result = PatchCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/other.txt").await.unwrap(), "one\nTWO\nthree\n");
    }

    #[tokio::test]
    async fn test_patch_garbage_input() {
        let mut c = ctx_with_files(vec![], &[]).await;
        c.stdin = "not a patch\n".to_string();
        let result = PatchCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_strip_components() {
        assert_eq!(strip_components("a/b/c.txt", 1), "b/c.txt");
        assert_eq!(strip_components("a/b/c.txt", 0), "a/b/c.txt");
        assert_eq!(strip_components("c.txt", 5), "c.txt");
    }
}
