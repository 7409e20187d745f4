use async_trait::async_trait;

use super::read_input;
use crate::commands::{Command, CommandContext, CommandResult};

pub struct UniqCommand;

#[derive(Debug, Clone, Copy, Default)]
struct UniqOptions {
    count: bool,
    only_repeated: bool,
    only_unique: bool,
    ignore_case: bool,
    skip_fields: usize,
    skip_chars: usize,
}

#[async_trait]
impl Command for UniqCommand {
    fn name(&self) -> &'static str {
        "uniq"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut opts = UniqOptions::default();
        let mut file: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-c" | "--count" => opts.count = true,
                "-d" | "--repeated" => opts.only_repeated = true,
                "-u" | "--unique" => opts.only_unique = true,
                "-i" | "--ignore-case" => opts.ignore_case = true,
                "-f" => {
                    i += 1;
                    opts.skip_fields = match ctx.args.get(i).and_then(|n| n.parse().ok()) {
                        Some(n) => n,
                        None => {
                            return CommandResult::error(
                                "uniq: invalid number of fields to skip\n".to_string(),
                            )
                        }
                    };
                }
                "-s" => {
                    i += 1;
                    opts.skip_chars = match ctx.args.get(i).and_then(|n| n.parse().ok()) {
                        Some(n) => n,
                        None => {
                            return CommandResult::error(
                                "uniq: invalid number of bytes to skip\n".to_string(),
                            )
                        }
                    };
                }
                "-" => file = Some("-".to_string()),
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("uniq: invalid option -- '{}'\n", a))
                }
                a => file = Some(a.to_string()),
            }
            i += 1;
        }

        let content = match read_input(&ctx, file.as_deref(), "uniq").await {
            Ok(c) => c,
            Err(e) => return e,
        };

        let lines: Vec<&str> = content.lines().collect();
        let mut groups: Vec<(usize, &str)> = Vec::new();
        for line in lines {
            match groups.last_mut() {
                Some((count, prev)) if same(prev, line, opts) => *count += 1,
                _ => groups.push((1, line)),
            }
        }

        let mut out = String::new();
        for (count, line) in groups {
            if opts.only_repeated && count < 2 {
                continue;
            }
            if opts.only_unique && count > 1 {
                continue;
            }
            if opts.count {
                out.push_str(&format!("{:7} {}\n", count, line));
            } else {
                out.push_str(line);
                out.push('\n');
            }
        }
        CommandResult::success(out)
    }
}

/// Compare two lines under the active skip/fold options.
fn same(a: &str, b: &str, opts: UniqOptions) -> bool {
    let ka = comparison_key(a, opts);
    let kb = comparison_key(b, opts);
    if opts.ignore_case {
        ka.to_lowercase() == kb.to_lowercase()
    } else {
        ka == kb
    }
}

fn comparison_key(line: &str, opts: UniqOptions) -> &str {
    let mut rest = line;
    for _ in 0..opts.skip_fields {
        rest = rest.trim_start_matches(|c: char| !c.is_whitespace());
        rest = rest.trim_start();
    }
    let skip = opts
        .skip_chars
        .min(rest.chars().count());
    match rest.char_indices().nth(skip) {
        Some((idx, _)) => &rest[idx..],
        None => "",
    }
}
