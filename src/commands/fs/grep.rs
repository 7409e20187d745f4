use async_trait::async_trait;
use regex_lite::Regex;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;
use std::sync::Arc;

pub struct GrepCommand;

#[derive(Debug, Clone, Default)]
struct GrepOptions {
    pattern: String,
    ignore_case: bool,
    line_numbers: bool,
    invert: bool,
    recursive: bool,
    count_only: bool,
    quiet: bool,
    files: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<GrepOptions, String> {
    let mut opts = GrepOptions::default();
    let mut positional: Vec<String> = Vec::new();
    let mut pattern_from_e = false;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-i" | "--ignore-case" => opts.ignore_case = true,
            "-n" | "--line-number" => opts.line_numbers = true,
            "-v" | "--invert-match" => opts.invert = true,
            "-r" | "-R" | "--recursive" => opts.recursive = true,
            "-c" | "--count" => opts.count_only = true,
            "-q" | "--quiet" => opts.quiet = true,
            // -P selects the regex engine; the one engine here already
            // covers the supported syntax.
            "-P" | "--perl-regexp" | "-E" | "--extended-regexp" => {}
            "-e" => {
                i += 1;
                match args.get(i) {
                    Some(p) => {
                        opts.pattern = p.clone();
                        pattern_from_e = true;
                    }
                    None => return Err("grep: option requires an argument -- 'e'".to_string()),
                }
            }
            "-" => positional.push("-".to_string()),
            a if a.starts_with('-') && a.len() > 1 => {
                return Err(format!("grep: invalid option -- '{}'", a))
            }
            a => positional.push(a.to_string()),
        }
        i += 1;
    }

    if !pattern_from_e {
        if positional.is_empty() {
            return Err("grep: no pattern\n\nusage: grep [-inrvcq] pattern [file ...]".to_string());
        }
        opts.pattern = positional.remove(0);
    }
    opts.files = positional;
    Ok(opts)
}

#[async_trait]
impl Command for GrepCommand {
    fn name(&self) -> &'static str {
        "grep"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let opts = match parse_args(&ctx.args) {
            Ok(o) => o,
            Err(e) => return CommandResult::with_exit_code(String::new(), format!("{}\n", e), 2),
        };

        let pattern = if opts.ignore_case {
            format!("(?i){}", opts.pattern)
        } else {
            opts.pattern.clone()
        };
        let regex = match Regex::new(&pattern) {
            Ok(r) => r,
            Err(e) => {
                return CommandResult::with_exit_code(
                    String::new(),
                    format!("grep: invalid pattern: {}\n", e),
                    2,
                )
            }
        };

        // Expand targets: stdin, plain files, or recursive trees.
        let mut targets: Vec<(String, Source)> = Vec::new();
        if opts.files.is_empty() {
            targets.push(("-".to_string(), Source::Stdin));
        } else {
            let fs = match ctx.require_fs("grep") {
                Ok(fs) => fs,
                Err(e) => return e,
            };
            for file in &opts.files {
                if file == "-" {
                    targets.push(("-".to_string(), Source::Stdin));
                    continue;
                }
                let resolved = ctx.resolve(&fs, file);
                let is_dir = fs
                    .stat(&resolved)
                    .await
                    .map(|s| s.is_directory())
                    .unwrap_or(false);
                if is_dir && opts.recursive {
                    collect_files(&fs, file, &resolved, &mut targets).await;
                } else {
                    targets.push((file.clone(), Source::File(resolved)));
                }
            }
        }

        let show_names = targets.len() > 1;
        let mut out = String::new();
        let mut err = String::new();
        let mut any_match = false;
        let mut read_error = false;

        for (display, source) in targets {
            let content = match source {
                Source::Stdin => ctx.stdin.clone(),
                Source::File(resolved) => {
                    let fs = match ctx.require_fs("grep") {
                        Ok(fs) => fs,
                        Err(e) => return e,
                    };
                    match fs.read(&resolved).await {
                        Ok(c) => c,
                        Err(_) => {
                            err.push_str(&format!(
                                "grep: {}: No such file or directory\n",
                                display
                            ));
                            read_error = true;
                            continue;
                        }
                    }
                }
            };

            let mut file_count = 0usize;
            for (line_no, line) in content.lines().enumerate() {
                let matched = regex.is_match(line) != opts.invert;
                if !matched {
                    continue;
                }
                any_match = true;
                file_count += 1;
                if opts.quiet || opts.count_only {
                    continue;
                }
                if show_names {
                    out.push_str(&display);
                    out.push(':');
                }
                if opts.line_numbers {
                    out.push_str(&format!("{}:", line_no + 1));
                }
                out.push_str(line);
                out.push('\n');
            }
            if opts.count_only && !opts.quiet {
                if show_names {
                    out.push_str(&format!("{}:{}\n", display, file_count));
                } else {
                    out.push_str(&format!("{}\n", file_count));
                }
            }
        }

        let exit_code = if any_match {
            0
        } else if read_error {
            2
        } else {
            1
        };
        if opts.quiet {
            return CommandResult::with_exit_code(String::new(), String::new(), exit_code);
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}

enum Source {
    Stdin,
    File(String),
}

/// Flatten a directory tree into file targets, sorted walk.
async fn collect_files(
    fs: &Arc<dyn FsCapability>,
    display: &str,
    resolved: &str,
    targets: &mut Vec<(String, Source)>,
) {
    let mut stack: Vec<(String, String)> = vec![(display.to_string(), resolved.to_string())];
    while let Some((display, resolved)) = stack.pop() {
        match fs.list_entries(&resolved).await {
            Ok(entries) => {
                for entry in entries.into_iter().rev() {
                    let child_display = format!("{}/{}", display.trim_end_matches('/'), entry.name);
                    let child_resolved =
                        format!("{}/{}", resolved.trim_end_matches('/'), entry.name);
                    if entry.is_directory() {
                        stack.push((child_display, child_resolved));
                    } else {
                        targets.push((child_display, Source::File(child_resolved)));
                    }
                }
            }
            Err(_) => continue,
        }
    }
}
