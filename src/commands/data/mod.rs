//! Data-class commands: structured-data filters and encodings.

pub mod jq;

use async_trait::async_trait;
use base64::Engine;

use super::registry::CommandRegistry;
use super::types::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(jq::JqCommand));
    reg.register(Box::new(jq::YqCommand));
    reg.register(Box::new(Base64Command));
    reg.register(Box::new(EnvsubstCommand));
}

pub struct Base64Command;

#[async_trait]
impl Command for Base64Command {
    fn name(&self) -> &'static str {
        "base64"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut decode = false;
        let mut file: Option<String> = None;
        for arg in &ctx.args {
            match arg.as_str() {
                "-d" | "--decode" => decode = true,
                "-" => file = Some("-".to_string()),
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("base64: invalid option -- '{}'\n", a))
                }
                a => file = Some(a.to_string()),
            }
        }

        let input = match file.as_deref() {
            None | Some("-") => ctx.stdin.clone(),
            Some(path) => {
                let fs = match ctx.require_fs("base64") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, path);
                match fs.read(&resolved).await {
                    Ok(c) => c,
                    Err(_) => {
                        return CommandResult::error(format!(
                            "base64: {}: No such file or directory\n",
                            path
                        ))
                    }
                }
            }
        };

        let engine = base64::engine::general_purpose::STANDARD;
        if decode {
            let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
            match engine.decode(compact.as_bytes()) {
                Ok(bytes) => CommandResult::success(String::from_utf8_lossy(&bytes).to_string()),
                Err(_) => CommandResult::error("base64: invalid input\n".to_string()),
            }
        } else {
            CommandResult::success(format!("{}\n", engine.encode(input.as_bytes())))
        }
    }
}

pub struct EnvsubstCommand;

#[async_trait]
impl Command for EnvsubstCommand {
    fn name(&self) -> &'static str {
        "envsubst"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut out = String::with_capacity(ctx.stdin.len());
        let mut chars = ctx.stdin.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        name.push(c);
                    }
                    out.push_str(ctx.env.get(&name).map(String::as_str).unwrap_or(""));
                }
                Some(c) if c.is_ascii_alphabetic() || *c == '_' => {
                    let mut name = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            name.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    out.push_str(ctx.env.get(&name).map(String::as_str).unwrap_or(""));
                }
                _ => out.push('$'),
            }
        }
        CommandResult::success(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx_with_stdin;

    #[tokio::test]
    async fn test_base64_encode() {
        let result = Base64Command
            .execute(ctx_with_stdin(vec![], "hello"))
            .await;
        assert_eq!(result.stdout, "aGVsbG8=\n");
    }

    #[tokio::test]
    async fn test_base64_decode() {
        let result = Base64Command
            .execute(ctx_with_stdin(vec!["-d"], "aGVsbG8=\n"))
            .await;
        assert_eq!(result.stdout, "hello");
    }

    #[tokio::test]
    async fn test_base64_decode_invalid() {
        let result = Base64Command
            .execute(ctx_with_stdin(vec!["-d"], "!!!"))
            .await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_envsubst_plain_and_braced() {
        let mut c = ctx_with_stdin(vec![], "hi $NAME, home=${HOME}!");
        c.env.insert("NAME".to_string(), "ana".to_string());
        c.env.insert("HOME".to_string(), "/h".to_string());
        let result = EnvsubstCommand.execute(c).await;
        assert_eq!(result.stdout, "hi ana, home=/h!");
    }

    #[tokio::test]
    async fn test_envsubst_unknown_is_empty() {
        let result = EnvsubstCommand
            .execute(ctx_with_stdin(vec![], "x=$MISSING."))
            .await;
        assert_eq!(result.stdout, "x=.");
    }

    #[tokio::test]
    async fn test_envsubst_lone_dollar() {
        let result = EnvsubstCommand
            .execute(ctx_with_stdin(vec![], "cost: $5"))
            .await;
        assert_eq!(result.stdout, "cost: $5");
    }
}
