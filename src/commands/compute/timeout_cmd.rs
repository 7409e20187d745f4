use std::time::Duration;

use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct TimeoutCommand;

#[async_trait]
impl Command for TimeoutCommand {
    fn name(&self) -> &'static str {
        "timeout"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut args = ctx.args.iter();
        let duration_arg = loop {
            match args.next() {
                // -s/-k are accepted for compatibility; signals are
                // meaningless in-process.
                Some(a) if a == "-s" || a == "--signal" || a == "-k" || a == "--kill-after" => {
                    args.next();
                }
                Some(a) => break a.clone(),
                None => {
                    return CommandResult::with_exit_code(
                        String::new(),
                        "timeout: missing operand\n".to_string(),
                        125,
                    )
                }
            }
        };

        let duration = match parse_duration(&duration_arg) {
            Some(d) => d,
            None => {
                return CommandResult::with_exit_code(
                    String::new(),
                    format!("timeout: invalid time interval '{}'\n", duration_arg),
                    125,
                )
            }
        };

        let rest: Vec<String> = args.cloned().collect();
        if rest.is_empty() {
            return CommandResult::with_exit_code(
                String::new(),
                "timeout: missing command\n".to_string(),
                125,
            );
        }

        // A path operand that cannot be resolved natively is
        // command-not-found, mirroring the shell's 127.
        let head = &rest[0];
        if head.contains('/') {
            let resolvable = match &ctx.fs {
                Some(fs) => fs.exists(&ctx.resolve(fs, head)).await,
                None => false,
            };
            if !resolvable {
                return CommandResult::with_exit_code(
                    String::new(),
                    format!("timeout: failed to run command '{}': No such file or directory\n", head),
                    127,
                );
            }
        }

        let exec_fn = match &ctx.exec_fn {
            Some(f) => f.clone(),
            None => {
                return CommandResult::with_exit_code(
                    String::new(),
                    "timeout: command execution is not available\n".to_string(),
                    126,
                )
            }
        };

        let line = rest.join(" ");
        let child = exec_fn(line, ctx.stdin.clone(), ctx.cwd.clone(), ctx.env.clone());
        match tokio::time::timeout(duration, child).await {
            Ok(result) => result,
            Err(_) => CommandResult::with_exit_code(String::new(), String::new(), 124),
        }
    }
}

pub struct SleepCommand;

#[async_trait]
impl Command for SleepCommand {
    fn name(&self) -> &'static str {
        "sleep"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let Some(arg) = ctx.args.first() else {
            return CommandResult::error("sleep: missing operand\n".to_string());
        };
        match parse_duration(arg) {
            Some(duration) => {
                tokio::time::sleep(duration).await;
                CommandResult::success(String::new())
            }
            None => CommandResult::error(format!("sleep: invalid time interval '{}'\n", arg)),
        }
    }
}

/// Parse `N`, `N.N`, or a suffixed `Ns`/`Nm`/`Nh`/`Nd` interval.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let (number, multiplier) = match s.chars().last() {
        Some('s') => (&s[..s.len() - 1], 1.0),
        Some('m') => (&s[..s.len() - 1], 60.0),
        Some('h') => (&s[..s.len() - 1], 3600.0),
        Some('d') => (&s[..s.len() - 1], 86400.0),
        _ => (s, 1.0),
    };
    let seconds: f64 = number.parse().ok()?;
    if seconds < 0.0 || !seconds.is_finite() {
        return None;
    }
    Some(Duration::from_secs_f64(seconds * multiplier))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::commands::types::test_support::ctx;
    use crate::commands::types::ExecFn;

    fn slow_exec(delay_ms: u64) -> ExecFn {
        Arc::new(move |_line, _stdin, _cwd, _env: HashMap<String, String>| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                CommandResult::success("done\n".to_string())
            })
        })
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_duration("1m"), Some(Duration::from_secs(60)));
        assert_eq!(parse_duration("0.5"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("-1"), None);
    }

    #[tokio::test]
    async fn test_timeout_missing_operand() {
        let result = TimeoutCommand.execute(ctx(vec![])).await;
        assert_eq!(result.exit_code, 125);
    }

    #[tokio::test]
    async fn test_timeout_missing_command() {
        let result = TimeoutCommand.execute(ctx(vec!["5"])).await;
        assert_eq!(result.exit_code, 125);
    }

    #[tokio::test]
    async fn test_timeout_unresolvable_path_is_127() {
        let result = TimeoutCommand.execute(ctx(vec!["5", "/no/such/bin"])).await;
        assert_eq!(result.exit_code, 127);
    }

    #[tokio::test]
    async fn test_timeout_child_finishes_in_time() {
        let mut c = ctx(vec!["5", "echo", "hi"]);
        c.exec_fn = Some(slow_exec(5));
        let result = TimeoutCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "done\n");
    }

    #[tokio::test]
    async fn test_timeout_expires_with_124() {
        let mut c = ctx(vec!["0.02", "sleep", "10"]);
        c.exec_fn = Some(slow_exec(5_000));
        let result = TimeoutCommand.execute(c).await;
        assert_eq!(result.exit_code, 124);
    }

    #[tokio::test]
    async fn test_sleep_invalid_interval() {
        let result = SleepCommand.execute(ctx(vec!["xx"])).await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_sleep_short() {
        let result = SleepCommand.execute(ctx(vec!["0.01"])).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "");
    }
}
