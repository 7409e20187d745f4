//! Extended-class commands: environment manipulation and odds and ends.

use async_trait::async_trait;

use super::registry::CommandRegistry;
use super::types::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(EnvCommand));
    reg.register(Box::new(IdCommand));
    reg.register(Box::new(UnameCommand));
    reg.register(Box::new(TacCommand));
}

pub struct EnvCommand;

#[async_trait]
impl Command for EnvCommand {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut env = ctx.env.clone();
        let mut i = 0;

        if ctx.args.get(i).map(String::as_str) == Some("-i") {
            env.clear();
            i += 1;
        }

        // Leading VAR=value assignments extend the environment.
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.split_once('=') {
                Some((key, value))
                    if !key.is_empty()
                        && key
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
                {
                    env.insert(key.to_string(), value.to_string());
                    i += 1;
                }
                _ => break,
            }
        }

        let rest = &ctx.args[i..];
        if rest.is_empty() {
            let mut pairs: Vec<(&String, &String)> = env.iter().collect();
            pairs.sort_by_key(|(k, _)| k.as_str());
            let mut out = String::new();
            for (key, value) in pairs {
                out.push_str(&format!("{}={}\n", key, value));
            }
            return CommandResult::success(out);
        }

        // Subcommand form: delegate back to the router with the merged env.
        let Some(exec_fn) = ctx.exec_fn.clone() else {
            return CommandResult::with_exit_code(
                String::new(),
                "env: command execution is not available\n".to_string(),
                126,
            );
        };
        let line = rest.join(" ");
        exec_fn(line, ctx.stdin.clone(), ctx.cwd.clone(), env).await
    }
}

pub struct IdCommand;

#[async_trait]
impl Command for IdCommand {
    fn name(&self) -> &'static str {
        "id"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let out = match ctx.args.first().map(String::as_str) {
            Some("-u") => "1000\n".to_string(),
            Some("-g") => "1000\n".to_string(),
            Some("-un") | Some("-nu") => "user\n".to_string(),
            _ => "uid=1000(user) gid=1000(user) groups=1000(user)\n".to_string(),
        };
        CommandResult::success(out)
    }
}

pub struct UnameCommand;

#[async_trait]
impl Command for UnameCommand {
    fn name(&self) -> &'static str {
        "uname"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let out = match ctx.args.first().map(String::as_str) {
            None | Some("-s") => "Linux\n".to_string(),
            Some("-r") => "6.1.0\n".to_string(),
            Some("-m") => "x86_64\n".to_string(),
            Some("-n") => "localhost\n".to_string(),
            Some("-a") => "Linux localhost 6.1.0 x86_64 GNU/Linux\n".to_string(),
            Some(other) => {
                return CommandResult::error(format!("uname: invalid option -- '{}'\n", other))
            }
        };
        CommandResult::success(out)
    }
}

pub struct TacCommand;

#[async_trait]
impl Command for TacCommand {
    fn name(&self) -> &'static str {
        "tac"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let content = match ctx.args.first() {
            None => ctx.stdin.clone(),
            Some(path) if path == "-" => ctx.stdin.clone(),
            Some(path) => {
                let fs = match ctx.require_fs("tac") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, path);
                match fs.read(&resolved).await {
                    Ok(c) => c,
                    Err(_) => {
                        return CommandResult::error(format!(
                            "tac: {}: No such file or directory\n",
                            path
                        ))
                    }
                }
            }
        };
        let mut lines: Vec<&str> = content.lines().collect();
        lines.reverse();
        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        CommandResult::success(out)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::commands::types::test_support::{ctx, ctx_with_stdin};
    use crate::commands::types::ExecFn;

    #[tokio::test]
    async fn test_env_prints_environment() {
        let mut c = ctx(vec![]);
        c.env.insert("PATH".to_string(), "/bin".to_string());
        let result = EnvCommand.execute(c).await;
        assert_eq!(result.stdout, "PATH=/bin\n");
    }

    #[tokio::test]
    async fn test_env_with_assignments_prints_merged() {
        let mut c = ctx(vec!["FOO=bar"]);
        c.env.insert("A".to_string(), "1".to_string());
        let result = EnvCommand.execute(c).await;
        assert_eq!(result.stdout, "A=1\nFOO=bar\n");
    }

    #[tokio::test]
    async fn test_env_dash_i_clears() {
        let mut c = ctx(vec!["-i", "ONLY=x"]);
        c.env.insert("A".to_string(), "1".to_string());
        let result = EnvCommand.execute(c).await;
        assert_eq!(result.stdout, "ONLY=x\n");
    }

    #[tokio::test]
    async fn test_env_runs_subcommand_with_merged_env() {
        // The exec callback records what environment it received.
        let exec: ExecFn = Arc::new(|line, _stdin, _cwd, env: HashMap<String, String>| {
            Box::pin(async move {
                CommandResult::success(format!(
                    "{}:{}\n",
                    line,
                    env.get("FOO").cloned().unwrap_or_default()
                ))
            })
        });
        let mut c = ctx(vec!["FOO=bar", "printenv", "FOO"]);
        c.exec_fn = Some(exec);
        let result = EnvCommand.execute(c).await;
        assert_eq!(result.stdout, "printenv FOO:bar\n");
    }

    #[tokio::test]
    async fn test_env_subcommand_without_exec_fn() {
        let result = EnvCommand.execute(ctx(vec!["FOO=bar", "true"])).await;
        assert_eq!(result.exit_code, 126);
    }

    #[tokio::test]
    async fn test_id_constant() {
        let result = IdCommand.execute(ctx(vec![])).await;
        assert_eq!(result.stdout, "uid=1000(user) gid=1000(user) groups=1000(user)\n");
        assert_eq!(IdCommand.execute(ctx(vec!["-u"])).await.stdout, "1000\n");
    }

    #[tokio::test]
    async fn test_uname() {
        assert_eq!(UnameCommand.execute(ctx(vec![])).await.stdout, "Linux\n");
        assert_eq!(
            UnameCommand.execute(ctx(vec!["-a"])).await.stdout,
            "Linux localhost 6.1.0 x86_64 GNU/Linux\n"
        );
    }

    #[tokio::test]
    async fn test_tac_reverses_lines() {
        let result = TacCommand
            .execute(ctx_with_stdin(vec![], "one\ntwo\nthree\n"))
            .await;
        assert_eq!(result.stdout, "three\ntwo\none\n");
    }

    #[tokio::test]
    async fn test_tac_empty() {
        let result = TacCommand.execute(ctx_with_stdin(vec![], "")).await;
        assert_eq!(result.stdout, "");
    }
}
