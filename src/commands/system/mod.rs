//! System-class commands. The runtime has no real host identity; `whoami`
//! and `hostname` answer with fixed values.

use async_trait::async_trait;

use super::registry::CommandRegistry;
use super::types::{Command, CommandContext, CommandResult};

/// Output cap for `yes`: the lane has no streaming, so the firehose is
/// bounded.
const YES_LINE_CAP: usize = 1000;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(YesCommand));
    reg.register(Box::new(WhoamiCommand));
    reg.register(Box::new(HostnameCommand));
    reg.register(Box::new(PrintenvCommand));
}

pub struct YesCommand;

#[async_trait]
impl Command for YesCommand {
    fn name(&self) -> &'static str {
        "yes"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let word = if ctx.args.is_empty() {
            "y".to_string()
        } else {
            ctx.args.join(" ")
        };
        let mut out = String::with_capacity((word.len() + 1) * YES_LINE_CAP);
        for _ in 0..YES_LINE_CAP {
            out.push_str(&word);
            out.push('\n');
        }
        CommandResult::success(out)
    }
}

pub struct WhoamiCommand;

#[async_trait]
impl Command for WhoamiCommand {
    fn name(&self) -> &'static str {
        "whoami"
    }

    async fn execute(&self, _ctx: CommandContext) -> CommandResult {
        CommandResult::success("user\n".to_string())
    }
}

pub struct HostnameCommand;

#[async_trait]
impl Command for HostnameCommand {
    fn name(&self) -> &'static str {
        "hostname"
    }

    async fn execute(&self, _ctx: CommandContext) -> CommandResult {
        CommandResult::success("localhost\n".to_string())
    }
}

pub struct PrintenvCommand;

#[async_trait]
impl Command for PrintenvCommand {
    fn name(&self) -> &'static str {
        "printenv"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut null_terminated = false;
        let mut names: Vec<&String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-0" | "--null" => null_terminated = true,
                _ => names.push(arg),
            }
        }
        let terminator = if null_terminated { '\0' } else { '\n' };

        if names.is_empty() {
            let mut pairs: Vec<(&String, &String)> = ctx.env.iter().collect();
            pairs.sort_by_key(|(k, _)| k.as_str());
            let mut out = String::new();
            for (key, value) in pairs {
                out.push_str(&format!("{}={}{}", key, value, terminator));
            }
            return CommandResult::success(out);
        }

        // One-variable form: unset variable means exit 1, no output.
        let mut out = String::new();
        let mut all_found = true;
        for name in names {
            match ctx.env.get(name) {
                Some(value) => out.push_str(&format!("{}{}", value, terminator)),
                None => all_found = false,
            }
        }
        CommandResult::with_exit_code(out, String::new(), i32::from(!all_found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx;

    #[tokio::test]
    async fn test_yes_capped() {
        let result = YesCommand.execute(ctx(vec![])).await;
        assert_eq!(result.stdout.lines().count(), YES_LINE_CAP);
        assert!(result.stdout.starts_with("y\ny\n"));
    }

    #[tokio::test]
    async fn test_yes_custom_word() {
        let result = YesCommand.execute(ctx(vec!["no", "way"])).await;
        assert!(result.stdout.starts_with("no way\n"));
    }

    #[tokio::test]
    async fn test_whoami_and_hostname_constant() {
        assert_eq!(WhoamiCommand.execute(ctx(vec![])).await.stdout, "user\n");
        assert_eq!(
            HostnameCommand.execute(ctx(vec![])).await.stdout,
            "localhost\n"
        );
    }

    #[tokio::test]
    async fn test_printenv_all_sorted() {
        let mut c = ctx(vec![]);
        c.env.insert("B".to_string(), "2".to_string());
        c.env.insert("A".to_string(), "1".to_string());
        let result = PrintenvCommand.execute(c).await;
        assert_eq!(result.stdout, "A=1\nB=2\n");
    }

    #[tokio::test]
    async fn test_printenv_single_variable() {
        let mut c = ctx(vec!["HOME"]);
        c.env.insert("HOME".to_string(), "/home/user".to_string());
        let result = PrintenvCommand.execute(c).await;
        assert_eq!(result.stdout, "/home/user\n");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_printenv_unset_variable() {
        let result = PrintenvCommand.execute(ctx(vec!["NOPE"])).await;
        assert_eq!(result.stdout, "");
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_printenv_null_terminated() {
        let mut c = ctx(vec!["-0", "X"]);
        c.env.insert("X".to_string(), "v".to_string());
        let result = PrintenvCommand.execute(c).await;
        assert_eq!(result.stdout, "v\0");
    }
}
