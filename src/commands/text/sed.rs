//! sed, restricted to the substitution form `s/pattern/replacement/flags`
//! (any delimiter). Supported flags: `g`, `i`, `p`.

use async_trait::async_trait;
use regex_lite::Regex;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct SedCommand;

#[derive(Debug, Clone)]
struct Substitution {
    regex: Regex,
    replacement: String,
    global: bool,
    print: bool,
}

#[async_trait]
impl Command for SedCommand {
    fn name(&self) -> &'static str {
        "sed"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut quiet = false;
        let mut scripts: Vec<String> = Vec::new();
        let mut files: Vec<String> = Vec::new();

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-n" | "--quiet" => quiet = true,
                "-e" | "--expression" => {
                    i += 1;
                    match ctx.args.get(i) {
                        Some(s) => scripts.push(s.clone()),
                        None => {
                            return CommandResult::error(
                                "sed: option requires an argument -- 'e'\n".to_string(),
                            )
                        }
                    }
                }
                "-" => files.push("-".to_string()),
                a if a.starts_with('-') && a.len() > 1 => {
                    return CommandResult::error(format!("sed: invalid option -- '{}'\n", a))
                }
                a => {
                    if scripts.is_empty() {
                        scripts.push(a.to_string());
                    } else {
                        files.push(a.to_string());
                    }
                }
            }
            i += 1;
        }

        if scripts.is_empty() {
            return CommandResult::error("sed: no script specified\n".to_string());
        }
        let mut substitutions = Vec::with_capacity(scripts.len());
        for script in &scripts {
            match parse_substitution(script) {
                Ok(s) => substitutions.push(s),
                Err(e) => return CommandResult::error(format!("sed: {}\n", e)),
            }
        }

        let mut inputs: Vec<String> = Vec::new();
        if files.is_empty() {
            inputs.push(ctx.stdin.clone());
        } else {
            for file in &files {
                if file == "-" {
                    inputs.push(ctx.stdin.clone());
                    continue;
                }
                let fs = match ctx.require_fs("sed") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, file);
                match fs.read(&resolved).await {
                    Ok(c) => inputs.push(c),
                    Err(_) => {
                        return CommandResult::with_exit_code(
                            String::new(),
                            format!("sed: can't read {}: No such file or directory\n", file),
                            2,
                        )
                    }
                }
            }
        }

        let mut out = String::new();
        for content in &inputs {
            for line in content.lines() {
                let mut current = line.to_string();
                let mut printed_by_flag = false;
                for sub in &substitutions {
                    let (next, replaced) = apply(sub, &current);
                    current = next;
                    if replaced && sub.print {
                        printed_by_flag = true;
                    }
                }
                if quiet {
                    if printed_by_flag {
                        out.push_str(&current);
                        out.push('\n');
                    }
                } else {
                    out.push_str(&current);
                    out.push('\n');
                    if printed_by_flag {
                        out.push_str(&current);
                        out.push('\n');
                    }
                }
            }
        }
        CommandResult::success(out)
    }
}

fn apply(sub: &Substitution, line: &str) -> (String, bool) {
    if !sub.regex.is_match(line) {
        return (line.to_string(), false);
    }
    let replaced = if sub.global {
        sub.regex
            .replace_all(line, sub.replacement.as_str())
            .to_string()
    } else {
        sub.regex.replace(line, sub.replacement.as_str()).to_string()
    };
    (replaced, true)
}

/// Parse `s<delim>pattern<delim>replacement<delim>flags`.
fn parse_substitution(script: &str) -> Result<Substitution, String> {
    let mut chars = script.chars();
    if chars.next() != Some('s') {
        return Err(format!(
            "unsupported script '{}' (only s/pattern/replacement/ is supported)",
            script
        ));
    }
    let delim = chars
        .next()
        .ok_or_else(|| "unterminated substitution".to_string())?;

    let mut parts: Vec<String> = vec![String::new()];
    let mut escaped = false;
    for c in chars {
        if escaped {
            // Keep the escape for the regex; a backslash-delimiter pair
            // becomes the bare delimiter.
            if c == delim {
                parts.last_mut().unwrap().push(c);
            } else {
                let part = parts.last_mut().unwrap();
                part.push('\\');
                part.push(c);
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delim {
            parts.push(String::new());
        } else {
            parts.last_mut().unwrap().push(c);
        }
    }
    if parts.len() < 3 {
        return Err(format!("unterminated substitution '{}'", script));
    }

    let mut pattern = parts[0].clone();
    let replacement = convert_replacement(&parts[1]);
    let flags = &parts[2];

    let mut global = false;
    let mut print = false;
    for flag in flags.chars() {
        match flag {
            'g' => global = true,
            'p' => print = true,
            'i' | 'I' => pattern = format!("(?i){}", pattern),
            other => return Err(format!("unknown flag '{}' in '{}'", other, script)),
        }
    }

    let regex = Regex::new(&pattern).map_err(|e| format!("invalid pattern: {}", e))?;
    Ok(Substitution {
        regex,
        replacement,
        global,
        print,
    })
}

/// Translate sed replacement syntax (`&`, `\1`..`\9`) to the regex
/// engine's `${N}` form, escaping `$`.
fn convert_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '&' => out.push_str("${0}"),
            '\\' => match chars.next() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str(&format!("${{{}}}", d));
                }
                Some('&') => out.push('&'),
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            },
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{ctx_with_files, ctx_with_stdin};

    #[tokio::test]
    async fn test_sed_basic_substitution() {
        let result = SedCommand
            .execute(ctx_with_stdin(vec!["s/foo/bar/"], "foo foo\nno match\n"))
            .await;
        assert_eq!(result.stdout, "bar foo\nno match\n");
    }

    #[tokio::test]
    async fn test_sed_global_flag() {
        let result = SedCommand
            .execute(ctx_with_stdin(vec!["s/o/0/g"], "foo boo\n"))
            .await;
        assert_eq!(result.stdout, "f00 b00\n");
    }

    #[tokio::test]
    async fn test_sed_case_insensitive() {
        let result = SedCommand
            .execute(ctx_with_stdin(vec!["s/FOO/x/i"], "foo\n"))
            .await;
        assert_eq!(result.stdout, "x\n");
    }

    #[tokio::test]
    async fn test_sed_ampersand_and_groups() {
        let result = SedCommand
            .execute(ctx_with_stdin(vec!["s/world/[&]/"], "hello world\n"))
            .await;
        assert_eq!(result.stdout, "hello [world]\n");

        let result = SedCommand
            .execute(ctx_with_stdin(vec![r"s/(\w+) (\w+)/\2 \1/"], "a b\n"))
            .await;
        assert_eq!(result.stdout, "b a\n");
    }

    #[tokio::test]
    async fn test_sed_alternate_delimiter() {
        let result = SedCommand
            .execute(ctx_with_stdin(vec!["s|/usr/bin|/opt|"], "/usr/bin/tool\n"))
            .await;
        assert_eq!(result.stdout, "/opt/tool\n");
    }

    #[tokio::test]
    async fn test_sed_quiet_with_print() {
        let result = SedCommand
            .execute(ctx_with_stdin(vec!["-n", "s/foo/bar/p"], "foo\nskip\n"))
            .await;
        assert_eq!(result.stdout, "bar\n");
    }

    #[tokio::test]
    async fn test_sed_multiple_expressions() {
        let result = SedCommand
            .execute(ctx_with_stdin(
                vec!["-e", "s/a/1/", "-e", "s/b/2/"],
                "ab\n",
            ))
            .await;
        assert_eq!(result.stdout, "12\n");
    }

    #[tokio::test]
    async fn test_sed_files() {
        let c = ctx_with_files(
            vec!["s/x/y/", "/a", "/b"],
            &[("/a", "x1\n"), ("/b", "x2\n")],
        )
        .await;
        let result = SedCommand.execute(c).await;
        assert_eq!(result.stdout, "y1\ny2\n");
    }

    #[tokio::test]
    async fn test_sed_non_substitution_rejected() {
        let result = SedCommand
            .execute(ctx_with_stdin(vec!["2d"], "a\nb\n"))
            .await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("only s/pattern/replacement/"));
    }

    #[tokio::test]
    async fn test_sed_missing_file() {
        let c = ctx_with_files(vec!["s/a/b/", "/none"], &[]).await;
        let result = SedCommand.execute(c).await;
        assert_eq!(result.exit_code, 2);
    }
}
