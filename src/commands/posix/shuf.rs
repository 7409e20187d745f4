use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use super::read_input;
use crate::commands::{Command, CommandContext, CommandResult};

/// `-r` without `-n` is capped to keep output bounded.
const REPEAT_DEFAULT_CAP: usize = 1000;

pub struct ShufCommand;

#[async_trait]
impl Command for ShufCommand {
    fn name(&self) -> &'static str {
        "shuf"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut head_count: Option<usize> = None;
        let mut repeat = false;
        let mut input_range: Option<(i64, i64)> = None;
        let mut echo_args: Option<Vec<String>> = None;
        let mut file: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-n" => {
                    i += 1;
                    head_count = match ctx.args.get(i).and_then(|n| n.parse().ok()) {
                        Some(n) => Some(n),
                        None => {
                            return CommandResult::error(
                                "shuf: invalid line count\n".to_string(),
                            )
                        }
                    };
                }
                "-r" => repeat = true,
                "-i" => {
                    i += 1;
                    input_range = match ctx.args.get(i).and_then(|spec| {
                        let (lo, hi) = spec.split_once('-')?;
                        Some((lo.parse().ok()?, hi.parse().ok()?))
                    }) {
                        Some(r) => Some(r),
                        None => {
                            return CommandResult::error(
                                "shuf: invalid input range\n".to_string(),
                            )
                        }
                    };
                }
                "-e" => {
                    echo_args = Some(ctx.args[i + 1..].to_vec());
                    break;
                }
                "-" => file = Some("-".to_string()),
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("shuf: invalid option -- '{}'\n", a))
                }
                a => file = Some(a.to_string()),
            }
            i += 1;
        }

        let lines: Vec<String> = if let Some(args) = echo_args {
            args
        } else if let Some((lo, hi)) = input_range {
            if lo > hi {
                return CommandResult::error("shuf: invalid input range\n".to_string());
            }
            (lo..=hi).map(|n| n.to_string()).collect()
        } else {
            match read_input(&ctx, file.as_deref(), "shuf").await {
                Ok(content) => content.lines().map(String::from).collect(),
                Err(e) => return e,
            }
        };

        let mut rng = rand::thread_rng();
        let mut out = String::new();
        if repeat {
            if lines.is_empty() {
                return CommandResult::success(String::new());
            }
            let count = head_count.unwrap_or(REPEAT_DEFAULT_CAP);
            for _ in 0..count {
                let idx = rng.gen_range(0..lines.len());
                out.push_str(&lines[idx]);
                out.push('\n');
            }
        } else {
            let mut shuffled = lines;
            shuffled.shuffle(&mut rng);
            if let Some(n) = head_count {
                shuffled.truncate(n);
            }
            for line in &shuffled {
                out.push_str(line);
                out.push('\n');
            }
        }
        CommandResult::success(out)
    }
}
