use async_trait::async_trait;

use super::arith;
use crate::commands::{Command, CommandContext, CommandResult};

pub struct ExprCommand;

#[async_trait]
impl Command for ExprCommand {
    fn name(&self) -> &'static str {
        "expr"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.is_empty() {
            return CommandResult::with_exit_code(
                String::new(),
                "expr: missing operand\n".to_string(),
                2,
            );
        }
        let expression = ctx.args.join(" ");
        match arith::eval(&expression) {
            Ok(value) => {
                // expr convention: exit 1 when the result is zero.
                let exit_code = if value == 0 { 1 } else { 0 };
                CommandResult::with_exit_code(format!("{}\n", value), String::new(), exit_code)
            }
            Err(e) => {
                CommandResult::with_exit_code(String::new(), format!("expr: {}\n", e), 2)
            }
        }
    }
}

pub struct BcCommand;

#[async_trait]
impl Command for BcCommand {
    fn name(&self) -> &'static str {
        "bc"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        // Expressions come from stdin, one per line; flags like -l are
        // accepted and ignored (integer arithmetic only).
        let mut out = String::new();
        for line in ctx.stdin.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed == "quit" {
                continue;
            }
            match arith::eval(trimmed) {
                Ok(value) => out.push_str(&format!("{}\n", value)),
                Err(e) => {
                    return CommandResult::with_exit_code(
                        out,
                        format!("bc: {}\n", e),
                        1,
                    )
                }
            }
        }
        CommandResult::success(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{ctx, ctx_with_stdin};

    #[tokio::test]
    async fn test_expr_addition() {
        let result = ExprCommand.execute(ctx(vec!["1", "+", "2"])).await;
        assert_eq!(result.stdout, "3\n");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_expr_zero_result_exits_one() {
        let result = ExprCommand.execute(ctx(vec!["2", "-", "2"])).await;
        assert_eq!(result.stdout, "0\n");
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_expr_parenthesized() {
        let result = ExprCommand.execute(ctx(vec!["(", "2", "+", "3", ")", "*", "4"])).await;
        assert_eq!(result.stdout, "20\n");
    }

    #[tokio::test]
    async fn test_expr_rejects_non_arithmetic() {
        let result = ExprCommand.execute(ctx(vec!["length", "abc"])).await;
        assert_eq!(result.exit_code, 2);
        assert!(result.stderr.starts_with("expr:"));
    }

    #[tokio::test]
    async fn test_expr_missing_operand() {
        let result = ExprCommand.execute(ctx(vec![])).await;
        assert_eq!(result.exit_code, 2);
    }

    #[tokio::test]
    async fn test_bc_evaluates_lines() {
        let result = BcCommand
            .execute(ctx_with_stdin(vec![], "1 + 2\n10 / 3\n"))
            .await;
        assert_eq!(result.stdout, "3\n3\n");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_bc_rejects_code() {
        let result = BcCommand
            .execute(ctx_with_stdin(vec![], "system(\"rm -rf /\")\n"))
            .await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.starts_with("bc:"));
    }

    #[tokio::test]
    async fn test_bc_empty_stdin() {
        let result = BcCommand.execute(ctx_with_stdin(vec![], "")).await;
        assert_eq!(result.stdout, "");
        assert_eq!(result.exit_code, 0);
    }
}
