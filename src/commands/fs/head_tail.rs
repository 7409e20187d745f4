//! head and tail. Both accept `-n N`, attached `-nN`, bare `-N`, and `-q`;
//! `head -n -N` drops the last N lines, `tail -n +N` starts at line N.

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

#[derive(Debug, Clone)]
enum LineSpec {
    Count(usize),
    /// `head -n -N`: everything except the last N lines.
    AllButLast(usize),
    /// `tail -n +N`: from line N (1-based) to the end.
    From(usize),
}

#[derive(Debug, Clone)]
struct Options {
    spec: LineSpec,
    quiet: bool,
    files: Vec<String>,
}

fn parse_args(args: &[String], command: &str) -> Result<Options, String> {
    let mut spec = LineSpec::Count(10);
    let mut quiet = false;
    let mut files = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "-n" {
            i += 1;
            let value = args
                .get(i)
                .ok_or_else(|| format!("{}: option requires an argument -- 'n'", command))?;
            spec = parse_spec(value, command)?;
        } else if let Some(value) = arg.strip_prefix("-n") {
            spec = parse_spec(value, command)?;
        } else if arg == "-q" || arg == "--quiet" {
            quiet = true;
        } else if arg == "-" {
            files.push(arg.clone());
        } else if let Some(digits) = arg.strip_prefix('-') {
            // Bare -N shorthand.
            if digits.chars().all(|c| c.is_ascii_digit()) && !digits.is_empty() {
                spec = LineSpec::Count(digits.parse().unwrap_or(10));
            } else {
                return Err(format!("{}: invalid option -- '{}'", command, arg));
            }
        } else {
            files.push(arg.clone());
        }
        i += 1;
    }
    Ok(Options { spec, quiet, files })
}

fn parse_spec(value: &str, command: &str) -> Result<LineSpec, String> {
    if let Some(rest) = value.strip_prefix('+') {
        let n = rest
            .parse()
            .map_err(|_| format!("{}: invalid number of lines: '{}'", command, value))?;
        return Ok(LineSpec::From(n));
    }
    if let Some(rest) = value.strip_prefix('-') {
        let n = rest
            .parse()
            .map_err(|_| format!("{}: invalid number of lines: '{}'", command, value))?;
        return Ok(LineSpec::AllButLast(n));
    }
    value
        .parse()
        .map(LineSpec::Count)
        .map_err(|_| format!("{}: invalid number of lines: '{}'", command, value))
}

fn take_head(content: &str, spec: &LineSpec) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let keep = match spec {
        LineSpec::Count(n) => lines.len().min(*n),
        LineSpec::AllButLast(n) => lines.len().saturating_sub(*n),
        // `+N` is tail vocabulary; treat as a plain count for head.
        LineSpec::From(n) => lines.len().min(*n),
    };
    join_lines(&lines[..keep], content, keep == lines.len())
}

fn take_tail(content: &str, spec: &LineSpec) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = match spec {
        LineSpec::Count(n) => lines.len().saturating_sub(*n),
        LineSpec::From(n) => n.saturating_sub(1).min(lines.len()),
        LineSpec::AllButLast(n) => lines.len().saturating_sub(*n),
    };
    join_lines(&lines[start..], content, true)
}

/// Rejoin selected lines, keeping the source's missing trailing newline
/// when the selection reaches the end.
fn join_lines(lines: &[&str], source: &str, reaches_end: bool) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    if !reaches_end || source.ends_with('\n') {
        out.push('\n');
    }
    out
}

async fn run(ctx: &CommandContext, command: &str, is_head: bool) -> CommandResult {
    let opts = match parse_args(&ctx.args, command) {
        Ok(o) => o,
        Err(e) => return CommandResult::error(format!("{}\n", e)),
    };

    let inputs: Vec<Option<String>> = if opts.files.is_empty() {
        vec![None]
    } else {
        opts.files.iter().map(|f| Some(f.clone())).collect()
    };

    let mut out = String::new();
    let mut err = String::new();
    let mut exit_code = 0;
    let show_headers = inputs.len() > 1 && !opts.quiet;

    for (i, input) in inputs.iter().enumerate() {
        let content = match input.as_deref() {
            None | Some("-") => ctx.stdin.clone(),
            Some(path) => {
                let fs = match ctx.require_fs(command) {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, path);
                match fs.read(&resolved).await {
                    Ok(c) => c,
                    Err(_) => {
                        err.push_str(&format!(
                            "{}: cannot open '{}' for reading: No such file or directory\n",
                            command, path
                        ));
                        exit_code = 1;
                        continue;
                    }
                }
            }
        };
        if show_headers {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("==> {} <==\n", input.as_deref().unwrap_or("-")));
        }
        out.push_str(&if is_head {
            take_head(&content, &opts.spec)
        } else {
            take_tail(&content, &opts.spec)
        });
    }
    CommandResult::with_exit_code(out, err, exit_code)
}

pub struct HeadCommand;

#[async_trait]
impl Command for HeadCommand {
    fn name(&self) -> &'static str {
        "head"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        run(&ctx, "head", true).await
    }
}

pub struct TailCommand;

#[async_trait]
impl Command for TailCommand {
    fn name(&self) -> &'static str {
        "tail"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        run(&ctx, "tail", false).await
    }
}
