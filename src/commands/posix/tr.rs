use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};

pub struct TrCommand;

#[async_trait]
impl Command for TrCommand {
    fn name(&self) -> &'static str {
        "tr"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut delete = false;
        let mut squeeze = false;
        let mut complement = false;
        let mut sets: Vec<String> = Vec::new();

        for arg in &ctx.args {
            match arg.as_str() {
                "-d" => delete = true,
                "-s" => squeeze = true,
                "-c" | "-C" => complement = true,
                "-ds" | "-sd" => {
                    delete = true;
                    squeeze = true;
                }
                "-cd" | "-dc" => {
                    complement = true;
                    delete = true;
                }
                a if a.starts_with('-') && a.len() > 1 => {
                    return CommandResult::error(format!("tr: invalid option -- '{}'\n", a))
                }
                a => sets.push(a.to_string()),
            }
        }

        if sets.is_empty() {
            return CommandResult::error("tr: missing operand\n".to_string());
        }

        let set1 = expand_set(&sets[0]);
        let set2 = sets.get(1).map(|s| expand_set(s));

        let in_set1 = |c: char| {
            let contained = set1.contains(&c);
            if complement {
                !contained
            } else {
                contained
            }
        };

        let mut out = String::with_capacity(ctx.stdin.len());
        let mut last_emitted: Option<char> = None;
        for c in ctx.stdin.chars() {
            if delete {
                if in_set1(c) {
                    continue;
                }
                push_maybe_squeezed(&mut out, c, squeeze && in_set1(c), &mut last_emitted);
                continue;
            }
            let translated = if in_set1(c) {
                match &set2 {
                    Some(set2) if !set2.is_empty() => {
                        if complement {
                            *set2.last().unwrap()
                        } else {
                            let idx = set1.iter().position(|&x| x == c).unwrap_or(0);
                            *set2.get(idx).unwrap_or_else(|| set2.last().unwrap())
                        }
                    }
                    _ => c,
                }
            } else {
                c
            };
            let squeeze_this = squeeze && in_set1(c);
            push_maybe_squeezed(&mut out, translated, squeeze_this, &mut last_emitted);
        }
        CommandResult::success(out)
    }
}

fn push_maybe_squeezed(out: &mut String, c: char, squeeze: bool, last: &mut Option<char>) {
    if squeeze && *last == Some(c) {
        return;
    }
    out.push(c);
    *last = Some(c);
}

/// Expand a set spec: character ranges (`a-z`), escapes (`\n`, `\t`), and
/// the common POSIX classes.
fn expand_set(spec: &str) -> Vec<char> {
    match spec {
        "[:upper:]" => return ('A'..='Z').collect(),
        "[:lower:]" => return ('a'..='z').collect(),
        "[:digit:]" => return ('0'..='9').collect(),
        "[:alpha:]" => {
            let mut v: Vec<char> = ('A'..='Z').collect();
            v.extend('a'..='z');
            return v;
        }
        "[:alnum:]" => {
            let mut v: Vec<char> = ('0'..='9').collect();
            v.extend('A'..='Z');
            v.extend('a'..='z');
            return v;
        }
        "[:space:]" => return vec![' ', '\t', '\n', '\r', '\x0b', '\x0c'],
        _ => {}
    }

    let chars: Vec<char> = spec.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            out.push(match chars[i + 1] {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '\\' => '\\',
                other => other,
            });
            i += 2;
        } else if i + 2 < chars.len() && chars[i + 1] == '-' && chars[i] <= chars[i + 2] {
            let (lo, hi) = (chars[i], chars[i + 2]);
            out.extend(lo..=hi);
            i += 3;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_stdin;

    #[tokio::test]
    async fn test_tr_ranges() {
        let result = TrCommand
            .execute(ctx_with_stdin(vec!["a-z", "A-Z"], "hello\n"))
            .await;
        assert_eq!(result.stdout, "HELLO\n");
    }

    #[tokio::test]
    async fn test_tr_classes() {
        let result = TrCommand
            .execute(ctx_with_stdin(vec!["[:lower:]", "[:upper:]"], "abcXY\n"))
            .await;
        assert_eq!(result.stdout, "ABCXY\n");
    }

    #[tokio::test]
    async fn test_tr_delete() {
        let result = TrCommand
            .execute(ctx_with_stdin(vec!["-d", "0-9"], "a1b2c3\n"))
            .await;
        assert_eq!(result.stdout, "abc\n");
    }

    #[tokio::test]
    async fn test_tr_squeeze() {
        let result = TrCommand
            .execute(ctx_with_stdin(vec!["-s", " "], "a   b  c\n"))
            .await;
        assert_eq!(result.stdout, "a b c\n");
    }

    #[tokio::test]
    async fn test_tr_complement_delete() {
        let result = TrCommand
            .execute(ctx_with_stdin(vec!["-cd", "0-9"], "a1b2\nc3"))
            .await;
        assert_eq!(result.stdout, "123");
    }

    #[tokio::test]
    async fn test_tr_short_set2_extends_with_last() {
        let result = TrCommand
            .execute(ctx_with_stdin(vec!["abc", "x"], "aabbcc\n"))
            .await;
        assert_eq!(result.stdout, "xxxxxx\n");
    }

    #[tokio::test]
    async fn test_tr_escape_sequences() {
        let result = TrCommand
            .execute(ctx_with_stdin(vec!["\\n", " "], "a\nb\n"))
            .await;
        assert_eq!(result.stdout, "a b ");
    }

    #[tokio::test]
    async fn test_tr_missing_operand() {
        let result = TrCommand.execute(ctx_with_stdin(vec![], "x")).await;
        assert_eq!(result.exit_code, 1);
    }
}
