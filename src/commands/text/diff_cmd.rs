use async_trait::async_trait;
use similar::{ChangeTag, TextDiff};

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct DiffCommand;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Normal,
    Unified(usize),
    Context(usize),
}

#[async_trait]
impl Command for DiffCommand {
    fn name(&self) -> &'static str {
        "diff"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut format = Format::Normal;
        let mut quiet = false;
        let mut files: Vec<String> = Vec::new();

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-u" => format = Format::Unified(3),
                "-c" => format = Format::Context(3),
                "-q" | "--brief" => quiet = true,
                "-U" => {
                    i += 1;
                    let n = ctx.args.get(i).and_then(|n| n.parse().ok()).unwrap_or(3);
                    format = Format::Unified(n);
                }
                "-" => files.push("-".to_string()),
                a if a.starts_with("-U") => {
                    format = Format::Unified(a[2..].parse().unwrap_or(3));
                }
                a if a.starts_with('-') && a.len() > 1 => {
                    return CommandResult::with_exit_code(
                        String::new(),
                        format!("diff: invalid option -- '{}'\n", a),
                        2,
                    )
                }
                a => files.push(a.to_string()),
            }
            i += 1;
        }

        if files.len() != 2 {
            return CommandResult::with_exit_code(
                String::new(),
                "diff: missing operand\n".to_string(),
                2,
            );
        }

        let mut contents: Vec<String> = Vec::with_capacity(2);
        for file in &files {
            if file == "-" {
                contents.push(ctx.stdin.clone());
                continue;
            }
            let fs = match ctx.require_fs("diff") {
                Ok(fs) => fs,
                Err(e) => return e,
            };
            let resolved = ctx.resolve(&fs, file);
            match fs.read(&resolved).await {
                Ok(c) => contents.push(c),
                Err(_) => {
                    return CommandResult::with_exit_code(
                        String::new(),
                        format!("diff: {}: No such file or directory\n", file),
                        2,
                    )
                }
            }
        }

        if contents[0] == contents[1] {
            return CommandResult::success(String::new());
        }
        if quiet {
            return CommandResult::with_exit_code(
                format!("Files {} and {} differ\n", files[0], files[1]),
                String::new(),
                1,
            );
        }

        let diff = TextDiff::from_lines(contents[0].as_str(), contents[1].as_str());
        let out = match format {
            Format::Unified(context) => diff
                .unified_diff()
                .context_radius(context)
                .header(&files[0], &files[1])
                .to_string(),
            Format::Context(context) => render_context(&diff, &files[0], &files[1], context),
            Format::Normal => render_normal(&diff),
        };
        CommandResult::with_exit_code(out, String::new(), 1)
    }
}

/// Classic `3c3`-style output.
fn render_normal(diff: &TextDiff<'_, '_, '_, str>) -> String {
    let mut out = String::new();
    for op in diff.ops() {
        let old = op.old_range();
        let new = op.new_range();
        let (tag, old_lines, new_lines): (char, _, _) = match op.tag() {
            similar::DiffTag::Equal => continue,
            similar::DiffTag::Delete => ('d', old.clone(), new.clone()),
            similar::DiffTag::Insert => ('a', old.clone(), new.clone()),
            similar::DiffTag::Replace => ('c', old.clone(), new.clone()),
        };
        out.push_str(&format!(
            "{}{}{}\n",
            range_label(&old_lines, tag == 'a'),
            tag,
            range_label(&new_lines, tag == 'd')
        ));
        for line in diff.old_slices()[old.clone()].iter() {
            out.push_str(&format!("< {}", ensure_newline(line)));
        }
        if tag == 'c' {
            out.push_str("---\n");
        }
        for line in diff.new_slices()[new.clone()].iter() {
            out.push_str(&format!("> {}", ensure_newline(line)));
        }
    }
    out
}

fn range_label(range: &std::ops::Range<usize>, anchor: bool) -> String {
    if anchor {
        // Insertions/deletions anchor at the preceding line.
        return format!("{}", range.start);
    }
    if range.len() <= 1 {
        format!("{}", range.start + 1)
    } else {
        format!("{},{}", range.start + 1, range.end)
    }
}

/// Context format, the `***`/`---` flavor.
fn render_context(
    diff: &TextDiff<'_, '_, '_, str>,
    old_name: &str,
    new_name: &str,
    context: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("*** {}\n--- {}\n", old_name, new_name));
    for group in diff.grouped_ops(context) {
        let old_start = group.first().map(|op| op.old_range().start).unwrap_or(0);
        let old_end = group.last().map(|op| op.old_range().end).unwrap_or(0);
        let new_start = group.first().map(|op| op.new_range().start).unwrap_or(0);
        let new_end = group.last().map(|op| op.new_range().end).unwrap_or(0);

        out.push_str("***************\n");
        out.push_str(&format!("*** {},{} ****\n", old_start + 1, old_end));
        for op in &group {
            for change in diff.iter_changes(op) {
                match change.tag() {
                    ChangeTag::Equal => {
                        out.push_str(&format!("  {}", ensure_newline(change.value())))
                    }
                    ChangeTag::Delete => {
                        out.push_str(&format!("- {}", ensure_newline(change.value())))
                    }
                    ChangeTag::Insert => {}
                }
            }
        }
        out.push_str(&format!("--- {},{} ----\n", new_start + 1, new_end));
        for op in &group {
            for change in diff.iter_changes(op) {
                match change.tag() {
                    ChangeTag::Equal => {
                        out.push_str(&format!("  {}", ensure_newline(change.value())))
                    }
                    ChangeTag::Insert => {
                        out.push_str(&format!("+ {}", ensure_newline(change.value())))
                    }
                    ChangeTag::Delete => {}
                }
            }
        }
    }
    out
}

fn ensure_newline(s: &str) -> String {
    if s.ends_with('\n') {
        s.to_string()
    } else {
        format!("{}\n", s)
    }
}
