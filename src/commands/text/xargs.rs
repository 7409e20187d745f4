//! xargs: build command lines from stdin tokens and run them through the
//! router's execution callback.

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};

pub struct XargsCommand;

#[async_trait]
impl Command for XargsCommand {
    fn name(&self) -> &'static str {
        "xargs"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut batch_size: Option<usize> = None;
        let mut replace_token: Option<String> = None;
        let mut null_separated = false;
        let mut command: Vec<String> = Vec::new();

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            if !command.is_empty() {
                command.push(arg.clone());
                i += 1;
                continue;
            }
            match arg.as_str() {
                "-n" => {
                    i += 1;
                    batch_size = match ctx.args.get(i).and_then(|n| n.parse().ok()) {
                        Some(n) if n > 0 => Some(n),
                        _ => {
                            return CommandResult::error(
                                "xargs: invalid number for -n option\n".to_string(),
                            )
                        }
                    };
                }
                "-I" => {
                    i += 1;
                    match ctx.args.get(i) {
                        Some(token) => replace_token = Some(token.clone()),
                        None => {
                            return CommandResult::error(
                                "xargs: option requires an argument -- 'I'\n".to_string(),
                            )
                        }
                    }
                }
                "-0" | "--null" => null_separated = true,
                a if a.starts_with('-') && a.len() > 1 => {
                    return CommandResult::error(format!("xargs: invalid option -- '{}'\n", a))
                }
                a => command.push(a.to_string()),
            }
            i += 1;
        }
        if command.is_empty() {
            command.push("echo".to_string());
        }

        let Some(exec_fn) = ctx.exec_fn.clone() else {
            return CommandResult::with_exit_code(
                String::new(),
                "xargs: command execution is not available\n".to_string(),
                126,
            );
        };

        // With -I the unit is a line; otherwise whitespace/null tokens.
        let items: Vec<String> = if replace_token.is_some() {
            ctx.stdin
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(String::from)
                .collect()
        } else if null_separated {
            ctx.stdin
                .split('\0')
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        } else {
            ctx.stdin.split_whitespace().map(String::from).collect()
        };

        let mut invocations: Vec<Vec<String>> = Vec::new();
        if let Some(token) = &replace_token {
            for item in &items {
                invocations.push(
                    command
                        .iter()
                        .map(|word| word.replace(token.as_str(), item))
                        .collect(),
                );
            }
        } else if items.is_empty() {
            invocations.push(command.clone());
        } else {
            let batch = batch_size.unwrap_or(items.len());
            for chunk in items.chunks(batch) {
                let mut line = command.clone();
                line.extend(chunk.iter().cloned());
                invocations.push(line);
            }
        }

        let mut out = String::new();
        let mut err = String::new();
        let mut exit_code = 0;
        for words in invocations {
            let line = words.join(" ");
            let result = exec_fn(line, String::new(), ctx.cwd.clone(), ctx.env.clone()).await;
            out.push_str(&result.stdout);
            err.push_str(&result.stderr);
            if result.exit_code != 0 {
                exit_code = 123;
            }
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::commands::types::test_support::ctx_with_stdin;
    use crate::commands::types::ExecFn;

    /// Records executed lines and echoes them back.
    fn recording_exec(log: Arc<Mutex<Vec<String>>>) -> ExecFn {
        Arc::new(move |line, _stdin, _cwd, _env: HashMap<String, String>| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push(line.clone());
                CommandResult::success(format!("{}\n", line))
            })
        })
    }

    #[tokio::test]
    async fn test_xargs_appends_tokens() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = ctx_with_stdin(vec!["echo"], "a b\nc\n");
        c.exec_fn = Some(recording_exec(log.clone()));
        let result = XargsCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(log.lock().unwrap().as_slice(), ["echo a b c"]);
    }

    #[tokio::test]
    async fn test_xargs_batches_with_n() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = ctx_with_stdin(vec!["-n", "2", "echo"], "1 2 3 4 5");
        c.exec_fn = Some(recording_exec(log.clone()));
        XargsCommand.execute(c).await;
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["echo 1 2", "echo 3 4", "echo 5"]
        );
    }

    #[tokio::test]
    async fn test_xargs_replace_token() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = ctx_with_stdin(vec!["-I", "{}", "mv", "{}", "{}.bak"], "a.txt\nb.txt\n");
        c.exec_fn = Some(recording_exec(log.clone()));
        XargsCommand.execute(c).await;
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["mv a.txt a.txt.bak", "mv b.txt b.txt.bak"]
        );
    }

    #[tokio::test]
    async fn test_xargs_null_separated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = ctx_with_stdin(vec!["-0", "echo"], "a b\0c d\0");
        c.exec_fn = Some(recording_exec(log.clone()));
        XargsCommand.execute(c).await;
        assert_eq!(log.lock().unwrap().as_slice(), ["echo a b c d"]);
    }

    #[tokio::test]
    async fn test_xargs_default_command_is_echo() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut c = ctx_with_stdin(vec![], "hi");
        c.exec_fn = Some(recording_exec(log.clone()));
        let result = XargsCommand.execute(c).await;
        assert_eq!(result.stdout, "echo hi\n");
    }

    #[tokio::test]
    async fn test_xargs_child_failure_is_123() {
        let exec: ExecFn = Arc::new(|_line, _stdin, _cwd, _env: HashMap<String, String>| {
            Box::pin(async move {
                CommandResult::with_exit_code(String::new(), "boom\n".to_string(), 1)
            })
        });
        let mut c = ctx_with_stdin(vec!["false"], "x");
        c.exec_fn = Some(exec);
        let result = XargsCommand.execute(c).await;
        assert_eq!(result.exit_code, 123);
    }

    #[tokio::test]
    async fn test_xargs_without_exec_fn() {
        let result = XargsCommand.execute(ctx_with_stdin(vec!["echo"], "x")).await;
        assert_eq!(result.exit_code, 126);
    }
}
