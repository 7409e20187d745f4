use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

/// `test` / `[`. Exit 0 on truth, 1 on falsehood, 2 on misuse.
pub struct TestCommand;

#[async_trait]
impl Command for TestCommand {
    fn name(&self) -> &'static str {
        "test"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut args: Vec<&str> = ctx.args.iter().map(String::as_str).collect();

        // `[` form requires the closing bracket.
        if args.last() == Some(&"]") {
            args.pop();
        }

        if args.is_empty() {
            return CommandResult::with_exit_code(String::new(), String::new(), 1);
        }

        let (negate, args) = if args[0] == "!" {
            (true, &args[1..])
        } else {
            (false, &args[..])
        };

        let verdict = match args {
            [] => Ok(false),
            [single] => Ok(!single.is_empty()),
            [op, path] => probe(&ctx, op, path).await,
            [left, op, right] => compare(left, op, right),
            _ => Err("test: too many arguments\n".to_string()),
        };

        match verdict {
            Ok(truth) => {
                let truth = truth != negate;
                CommandResult::with_exit_code(String::new(), String::new(), i32::from(!truth))
            }
            Err(message) => CommandResult::with_exit_code(String::new(), message, 2),
        }
    }
}

async fn probe(ctx: &CommandContext, op: &str, path: &str) -> Result<bool, String> {
    match op {
        "-e" | "-f" | "-d" => {
            let fs = ctx
                .fs
                .clone()
                .ok_or_else(|| "test: filesystem capability not available\n".to_string())?;
            let resolved = ctx.resolve(&fs, path);
            Ok(match fs.stat(&resolved).await {
                Ok(stat) => match op {
                    "-f" => stat.is_file(),
                    "-d" => stat.is_directory(),
                    _ => true,
                },
                Err(_) => false,
            })
        }
        "-n" => Ok(!path.is_empty()),
        "-z" => Ok(path.is_empty()),
        _ => Err(format!("test: {}: unary operator expected\n", op)),
    }
}

fn compare(left: &str, op: &str, right: &str) -> Result<bool, String> {
    match op {
        "=" | "==" => Ok(left == right),
        "!=" => Ok(left != right),
        "-eq" | "-ne" | "-lt" | "-le" | "-gt" | "-ge" => {
            let l: i64 = left
                .parse()
                .map_err(|_| format!("test: {}: integer expression expected\n", left))?;
            let r: i64 = right
                .parse()
                .map_err(|_| format!("test: {}: integer expression expected\n", right))?;
            Ok(match op {
                "-eq" => l == r,
                "-ne" => l != r,
                "-lt" => l < r,
                "-le" => l <= r,
                "-gt" => l > r,
                _ => l >= r,
            })
        }
        _ => Err(format!("test: {}: binary operator expected\n", op)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{ctx, ctx_with_files};

    #[tokio::test]
    async fn test_file_probes() {
        let c = ctx_with_files(vec!["-f", "/f.txt"], &[("/f.txt", "x")]).await;
        assert_eq!(TestCommand.execute(c).await.exit_code, 0);

        let c = ctx_with_files(vec!["-d", "/f.txt"], &[("/f.txt", "x")]).await;
        assert_eq!(TestCommand.execute(c).await.exit_code, 1);

        let c = ctx_with_files(vec!["-e", "/missing"], &[]).await;
        assert_eq!(TestCommand.execute(c).await.exit_code, 1);
    }

    #[tokio::test]
    async fn test_directory_probe() {
        let c = ctx_with_files(vec!["-d", "/dir"], &[("/dir/x", "")]).await;
        assert_eq!(TestCommand.execute(c).await.exit_code, 0);
    }

    #[tokio::test]
    async fn test_bracket_form() {
        let c = ctx_with_files(vec!["-e", "/f", "]"], &[("/f", "")]).await;
        assert_eq!(TestCommand.execute(c).await.exit_code, 0);
    }

    #[tokio::test]
    async fn test_string_truth() {
        assert_eq!(TestCommand.execute(ctx(vec!["hello"])).await.exit_code, 0);
        assert_eq!(TestCommand.execute(ctx(vec![""])).await.exit_code, 1);
        assert_eq!(TestCommand.execute(ctx(vec![])).await.exit_code, 1);
    }

    #[tokio::test]
    async fn test_negation() {
        let c = ctx_with_files(vec!["!", "-e", "/missing"], &[]).await;
        assert_eq!(TestCommand.execute(c).await.exit_code, 0);
    }

    #[tokio::test]
    async fn test_string_comparison() {
        assert_eq!(TestCommand.execute(ctx(vec!["a", "=", "a"])).await.exit_code, 0);
        assert_eq!(TestCommand.execute(ctx(vec!["a", "!=", "a"])).await.exit_code, 1);
    }

    #[tokio::test]
    async fn test_numeric_comparison() {
        assert_eq!(TestCommand.execute(ctx(vec!["2", "-gt", "1"])).await.exit_code, 0);
        assert_eq!(TestCommand.execute(ctx(vec!["2", "-lt", "1"])).await.exit_code, 1);
    }

    #[tokio::test]
    async fn test_misuse_is_exit_two() {
        assert_eq!(TestCommand.execute(ctx(vec!["a", "-what", "b"])).await.exit_code, 2);
        assert_eq!(
            TestCommand.execute(ctx(vec!["2", "-eq", "x"])).await.exit_code,
            2
        );
    }
}
