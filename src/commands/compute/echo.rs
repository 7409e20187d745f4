use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};

pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut no_newline = false;
        let mut interpret_escapes = false;
        let mut start = 0;

        while start < ctx.args.len() {
            match ctx.args[start].as_str() {
                "-n" => no_newline = true,
                "-e" => interpret_escapes = true,
                "-E" => interpret_escapes = false,
                "-ne" | "-en" => {
                    no_newline = true;
                    interpret_escapes = true;
                }
                _ => break,
            }
            start += 1;
        }

        let mut output = ctx.args[start..].join(" ");
        if interpret_escapes {
            output = expand_escapes(&output);
        }
        if !no_newline {
            output.push('\n');
        }
        CommandResult::success(output)
    }
}

/// Expand `echo -e` escape sequences. Unknown escapes are kept verbatim.
fn expand_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx;

    #[tokio::test]
    async fn test_echo_joins_args() {
        let result = EchoCommand.execute(ctx(vec!["hello", "world"])).await;
        assert_eq!(result.stdout, "hello world\n");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_echo_empty() {
        let result = EchoCommand.execute(ctx(vec![])).await;
        assert_eq!(result.stdout, "\n");
    }

    #[tokio::test]
    async fn test_echo_n_suppresses_newline() {
        let result = EchoCommand.execute(ctx(vec!["-n", "hi"])).await;
        assert_eq!(result.stdout, "hi");
    }

    #[tokio::test]
    async fn test_echo_e_escapes() {
        let result = EchoCommand.execute(ctx(vec!["-e", "a\\tb\\nc"])).await;
        assert_eq!(result.stdout, "a\tb\nc\n");
    }

    #[tokio::test]
    async fn test_echo_combined_flags() {
        let result = EchoCommand.execute(ctx(vec!["-en", "x\\n"])).await;
        assert_eq!(result.stdout, "x\n");
        let result = EchoCommand.execute(ctx(vec!["-ne", "y"])).await;
        assert_eq!(result.stdout, "y");
    }

    #[tokio::test]
    async fn test_echo_big_e_disables_escapes() {
        let result = EchoCommand.execute(ctx(vec!["-E", "a\\nb"])).await;
        assert_eq!(result.stdout, "a\\nb\n");
    }

    #[tokio::test]
    async fn test_echo_unknown_escape_kept() {
        let result = EchoCommand.execute(ctx(vec!["-e", "a\\qb"])).await;
        assert_eq!(result.stdout, "a\\qb\n");
    }
}
