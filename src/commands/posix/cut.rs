use async_trait::async_trait;

use super::read_input;
use crate::commands::{Command, CommandContext, CommandResult};

pub struct CutCommand;

#[async_trait]
impl Command for CutCommand {
    fn name(&self) -> &'static str {
        "cut"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut delimiter = '\t';
        let mut fields: Option<Vec<(usize, usize)>> = None;
        let mut chars: Option<Vec<(usize, usize)>> = None;
        let mut file: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            if arg == "-d" {
                i += 1;
                match ctx.args.get(i).and_then(|d| d.chars().next()) {
                    Some(c) => delimiter = c,
                    None => {
                        return CommandResult::error(
                            "cut: option requires an argument -- 'd'\n".to_string(),
                        )
                    }
                }
            } else if let Some(d) = arg.strip_prefix("-d") {
                delimiter = d.chars().next().unwrap_or('\t');
            } else if arg == "-f" {
                i += 1;
                match ctx.args.get(i).map(|s| parse_ranges(s)) {
                    Some(Ok(r)) => fields = Some(r),
                    Some(Err(e)) => return CommandResult::error(format!("cut: {}\n", e)),
                    None => {
                        return CommandResult::error(
                            "cut: option requires an argument -- 'f'\n".to_string(),
                        )
                    }
                }
            } else if let Some(spec) = arg.strip_prefix("-f") {
                match parse_ranges(spec) {
                    Ok(r) => fields = Some(r),
                    Err(e) => return CommandResult::error(format!("cut: {}\n", e)),
                }
            } else if arg == "-c" {
                i += 1;
                match ctx.args.get(i).map(|s| parse_ranges(s)) {
                    Some(Ok(r)) => chars = Some(r),
                    Some(Err(e)) => return CommandResult::error(format!("cut: {}\n", e)),
                    None => {
                        return CommandResult::error(
                            "cut: option requires an argument -- 'c'\n".to_string(),
                        )
                    }
                }
            } else if let Some(spec) = arg.strip_prefix("-c") {
                match parse_ranges(spec) {
                    Ok(r) => chars = Some(r),
                    Err(e) => return CommandResult::error(format!("cut: {}\n", e)),
                }
            } else if arg.starts_with('-') && arg != "-" {
                return CommandResult::error(format!("cut: invalid option -- '{}'\n", arg));
            } else {
                file = Some(arg.clone());
            }
            i += 1;
        }

        if fields.is_none() && chars.is_none() {
            return CommandResult::error(
                "cut: you must specify a list of bytes, characters, or fields\n".to_string(),
            );
        }

        let content = match read_input(&ctx, file.as_deref(), "cut").await {
            Ok(c) => c,
            Err(e) => return e,
        };

        let mut out = String::new();
        for line in content.lines() {
            if let Some(ranges) = &chars {
                let cs: Vec<char> = line.chars().collect();
                let mut selected = String::new();
                for &(lo, hi) in ranges {
                    for idx in lo..=hi.min(cs.len()) {
                        if idx >= 1 {
                            selected.push(cs[idx - 1]);
                        }
                    }
                }
                out.push_str(&selected);
            } else if let Some(ranges) = &fields {
                // Lines without the delimiter pass through whole.
                if !line.contains(delimiter) {
                    out.push_str(line);
                } else {
                    let parts: Vec<&str> = line.split(delimiter).collect();
                    let mut selected: Vec<&str> = Vec::new();
                    for &(lo, hi) in ranges {
                        for idx in lo..=hi.min(parts.len()) {
                            if idx >= 1 {
                                selected.push(parts[idx - 1]);
                            }
                        }
                    }
                    out.push_str(&selected.join(&delimiter.to_string()));
                }
            }
            out.push('\n');
        }
        CommandResult::success(out)
    }
}

/// Parse a list spec like `1,3-5,7-`. Returns 1-based inclusive ranges.
fn parse_ranges(spec: &str) -> Result<Vec<(usize, usize)>, String> {
    let mut ranges = Vec::new();
    for part in spec.split(',') {
        if part.is_empty() {
            return Err("fields are numbered from 1".to_string());
        }
        if let Some((lo, hi)) = part.split_once('-') {
            let lo = if lo.is_empty() {
                1
            } else {
                lo.parse::<usize>().map_err(|_| bad_list(part))?
            };
            let hi = if hi.is_empty() {
                usize::MAX
            } else {
                hi.parse::<usize>().map_err(|_| bad_list(part))?
            };
            if lo == 0 || hi < lo {
                return Err(bad_list(part));
            }
            ranges.push((lo, hi));
        } else {
            let n = part.parse::<usize>().map_err(|_| bad_list(part))?;
            if n == 0 {
                return Err("fields are numbered from 1".to_string());
            }
            ranges.push((n, n));
        }
    }
    Ok(ranges)
}

fn bad_list(part: &str) -> String {
    format!("invalid field list: '{}'", part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_stdin;

    #[tokio::test]
    async fn test_cut_fields() {
        let result = CutCommand
            .execute(ctx_with_stdin(
                vec!["-d", ":", "-f", "1,3"],
                "a:b:c\nx:y:z\n",
            ))
            .await;
        assert_eq!(result.stdout, "a:c\nx:z\n");
    }

    #[tokio::test]
    async fn test_cut_field_range() {
        let result = CutCommand
            .execute(ctx_with_stdin(vec!["-d", ",", "-f", "2-"], "1,2,3,4\n"))
            .await;
        assert_eq!(result.stdout, "2,3,4\n");
    }

    #[tokio::test]
    async fn test_cut_line_without_delimiter_passes_through() {
        let result = CutCommand
            .execute(ctx_with_stdin(vec!["-d", ":", "-f", "2"], "nodelim\n"))
            .await;
        assert_eq!(result.stdout, "nodelim\n");
    }

    #[tokio::test]
    async fn test_cut_characters() {
        let result = CutCommand
            .execute(ctx_with_stdin(vec!["-c", "1-3"], "abcdef\n"))
            .await;
        assert_eq!(result.stdout, "abc\n");
    }

    #[tokio::test]
    async fn test_cut_attached_flags() {
        let result = CutCommand
            .execute(ctx_with_stdin(vec!["-d:", "-f2"], "a:b:c\n"))
            .await;
        assert_eq!(result.stdout, "b\n");
    }

    #[tokio::test]
    async fn test_cut_requires_list() {
        let result = CutCommand.execute(ctx_with_stdin(vec![], "x\n")).await;
        assert_eq!(result.exit_code, 1);
    }
}
