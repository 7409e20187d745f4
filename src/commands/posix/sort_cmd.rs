use std::cmp::Ordering;

use async_trait::async_trait;

use super::read_input;
use crate::commands::{Command, CommandContext, CommandResult};

pub struct SortCommand;

#[derive(Debug, Clone, Default)]
struct KeySpec {
    start_field: usize,
    end_field: Option<usize>,
    numeric: bool,
    reverse: bool,
}

#[derive(Debug, Clone, Default)]
struct SortOptions {
    reverse: bool,
    numeric: bool,
    unique: bool,
    fold_case: bool,
    keys: Vec<KeySpec>,
    separator: Option<char>,
}

#[async_trait]
impl Command for SortCommand {
    fn name(&self) -> &'static str {
        "sort"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut opts = SortOptions::default();
        let mut files: Vec<String> = Vec::new();

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-r" | "--reverse" => opts.reverse = true,
                "-n" | "--numeric-sort" => opts.numeric = true,
                "-u" | "--unique" => opts.unique = true,
                "-f" | "--ignore-case" => opts.fold_case = true,
                "-k" | "--key" => {
                    i += 1;
                    match ctx.args.get(i).map(|s| parse_key(s)) {
                        Some(Ok(key)) => opts.keys.push(key),
                        Some(Err(e)) => return CommandResult::error(format!("sort: {}\n", e)),
                        None => {
                            return CommandResult::error(
                                "sort: option requires an argument -- 'k'\n".to_string(),
                            )
                        }
                    }
                }
                "-t" | "--field-separator" => {
                    i += 1;
                    opts.separator = ctx.args.get(i).and_then(|s| s.chars().next());
                }
                "-" => files.push("-".to_string()),
                a if a.starts_with("-k") => match parse_key(&a[2..]) {
                    Ok(key) => opts.keys.push(key),
                    Err(e) => return CommandResult::error(format!("sort: {}\n", e)),
                },
                a if a.starts_with("-t") => {
                    opts.separator = a[2..].chars().next();
                }
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("sort: invalid option -- '{}'\n", a))
                }
                a => files.push(a.to_string()),
            }
            i += 1;
        }

        let mut content = String::new();
        if files.is_empty() {
            content = ctx.stdin.clone();
        } else {
            for file in &files {
                match read_input(&ctx, Some(file.as_str()), "sort").await {
                    Ok(c) => content.push_str(&c),
                    Err(e) => return e,
                }
            }
        }

        let mut lines: Vec<&str> = content.lines().collect();
        lines.sort_by(|a, b| compare(a, b, &opts));

        if opts.unique {
            // Uniqueness is judged by the same comparison used for
            // ordering: with -k, lines with equal keys collapse even when
            // the full lines differ.
            lines.dedup_by(|a, b| compare_without_reverse(a, b, &opts) == Ordering::Equal);
        }

        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        CommandResult::success(out)
    }
}

/// Parse `-k` specs of the form `N`, `N,M`, `Nn`, `Nr`, `N,Mn`.
fn parse_key(spec: &str) -> Result<KeySpec, String> {
    let mut key = KeySpec::default();
    let (start, end) = match spec.split_once(',') {
        Some((s, e)) => (s, Some(e)),
        None => (spec, None),
    };
    let parse_part = |part: &str, key: &mut KeySpec| -> Result<usize, String> {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        let field = digits
            .parse::<usize>()
            .map_err(|_| format!("invalid key spec: '{}'", spec))?;
        for modifier in part[digits.len()..].chars() {
            match modifier {
                'n' => key.numeric = true,
                'r' => key.reverse = true,
                other => return Err(format!("invalid key modifier: '{}'", other)),
            }
        }
        if field == 0 {
            return Err("fields are numbered from 1".to_string());
        }
        Ok(field)
    };
    key.start_field = parse_part(start, &mut key)?;
    if let Some(end) = end {
        key.end_field = Some(parse_part(end, &mut key)?);
    }
    Ok(key)
}

fn split_fields<'a>(line: &'a str, separator: Option<char>) -> Vec<&'a str> {
    match separator {
        Some(sep) => line.split(sep).collect(),
        None => line.split_whitespace().collect(),
    }
}

fn key_text(line: &str, key: &KeySpec, separator: Option<char>) -> String {
    let fields = split_fields(line, separator);
    let start = key.start_field.saturating_sub(1);
    let end = key.end_field.unwrap_or(key.start_field);
    fields
        .iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .copied()
        .collect::<Vec<&str>>()
        .join(" ")
}

fn compare_text(a: &str, b: &str, numeric: bool, fold_case: bool) -> Ordering {
    if numeric {
        let na = leading_number(a);
        let nb = leading_number(b);
        return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
    }
    if fold_case {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

fn leading_number(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || c == '-' && i == 0 || c == '.' {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse::<f64>().unwrap_or(0.0)
}

fn compare_without_reverse(a: &str, b: &str, opts: &SortOptions) -> Ordering {
    if opts.keys.is_empty() {
        return compare_text(a, b, opts.numeric, opts.fold_case);
    }
    for key in &opts.keys {
        let ka = key_text(a, key, opts.separator);
        let kb = key_text(b, key, opts.separator);
        let ord = compare_text(&ka, &kb, key.numeric || opts.numeric, opts.fold_case);
        let ord = if key.reverse { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare(a: &str, b: &str, opts: &SortOptions) -> Ordering {
    let mut ord = compare_without_reverse(a, b, opts);
    if ord == Ordering::Equal && !opts.keys.is_empty() && !opts.unique {
        // Last-resort whole-line comparison keeps output deterministic.
        ord = a.cmp(b);
    }
    if opts.reverse {
        ord.reverse()
    } else {
        ord
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_stdin;

    #[tokio::test]
    async fn test_sort_lexical() {
        let result = SortCommand
            .execute(ctx_with_stdin(vec![], "banana\napple\ncherry\n"))
            .await;
        assert_eq!(result.stdout, "apple\nbanana\ncherry\n");
    }

    #[tokio::test]
    async fn test_sort_reverse() {
        let result = SortCommand
            .execute(ctx_with_stdin(vec!["-r"], "a\nc\nb\n"))
            .await;
        assert_eq!(result.stdout, "c\nb\na\n");
    }

    #[tokio::test]
    async fn test_sort_numeric() {
        let result = SortCommand
            .execute(ctx_with_stdin(vec!["-n"], "10\n9\n100\n"))
            .await;
        assert_eq!(result.stdout, "9\n10\n100\n");
    }

    #[tokio::test]
    async fn test_sort_unique() {
        let result = SortCommand
            .execute(ctx_with_stdin(vec!["-u"], "b\na\nb\na\n"))
            .await;
        assert_eq!(result.stdout, "a\nb\n");
    }

    #[tokio::test]
    async fn test_sort_key_numeric() {
        let result = SortCommand
            .execute(ctx_with_stdin(
                vec!["-t", ":", "-k", "2n"],
                "a:30\nb:4\nc:100\n",
            ))
            .await;
        assert_eq!(result.stdout, "b:4\na:30\nc:100\n");
    }

    #[tokio::test]
    async fn test_sort_unique_with_key_collapses_equal_keys() {
        // Lines differ, keys are equal: -u keeps the first per key.
        let result = SortCommand
            .execute(ctx_with_stdin(
                vec!["-t", ":", "-k", "1,1", "-u"],
                "x:1\nx:2\ny:9\n",
            ))
            .await;
        assert_eq!(result.stdout, "x:1\ny:9\n");
    }

    #[tokio::test]
    async fn test_sort_multi_key() {
        let result = SortCommand
            .execute(ctx_with_stdin(
                vec!["-t", ":", "-k", "1,1", "-k", "2n"],
                "b:2\na:10\na:9\nb:1\n",
            ))
            .await;
        assert_eq!(result.stdout, "a:9\na:10\nb:1\nb:2\n");
    }

    #[tokio::test]
    async fn test_sort_fold_case() {
        let result = SortCommand
            .execute(ctx_with_stdin(vec!["-f"], "Banana\napple\nCherry\n"))
            .await;
        assert_eq!(result.stdout, "apple\nBanana\nCherry\n");
    }

    #[tokio::test]
    async fn test_sort_key_reverse_modifier() {
        let result = SortCommand
            .execute(ctx_with_stdin(vec!["-k", "1nr"], "1\n3\n2\n"))
            .await;
        assert_eq!(result.stdout, "3\n2\n1\n");
    }
}
