use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};

pub struct SeqCommand;

#[async_trait]
impl Command for SeqCommand {
    fn name(&self) -> &'static str {
        "seq"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut separator = "\n".to_string();
        let mut equal_width = false;
        let mut operands: Vec<i64> = Vec::new();

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            if arg == "-s" {
                i += 1;
                match ctx.args.get(i) {
                    Some(sep) => separator = sep.clone(),
                    None => {
                        return CommandResult::error(
                            "seq: option requires an argument -- 's'\n".to_string(),
                        )
                    }
                }
            } else if let Some(sep) = arg.strip_prefix("-s") {
                // Attached separator, but not a negative operand.
                if sep.parse::<i64>().is_err() {
                    separator = sep.to_string();
                } else {
                    match arg.parse::<i64>() {
                        Ok(n) => operands.push(n),
                        Err(_) => separator = sep.to_string(),
                    }
                }
            } else if arg == "-w" {
                equal_width = true;
            } else {
                match arg.parse::<i64>() {
                    Ok(n) => operands.push(n),
                    Err(_) => {
                        return CommandResult::error(format!(
                            "seq: invalid argument: '{}'\n",
                            arg
                        ))
                    }
                }
            }
            i += 1;
        }

        let (first, step, last) = match operands.len() {
            1 => (1, 1, operands[0]),
            2 => (operands[0], 1, operands[1]),
            3 => (operands[0], operands[1], operands[2]),
            0 => return CommandResult::error("seq: missing operand\n".to_string()),
            _ => return CommandResult::error("seq: extra operand\n".to_string()),
        };
        if step == 0 {
            return CommandResult::error("seq: invalid zero increment\n".to_string());
        }

        let mut values: Vec<i64> = Vec::new();
        let mut n = first;
        while (step > 0 && n <= last) || (step < 0 && n >= last) {
            values.push(n);
            n += step;
        }

        let width = if equal_width {
            values
                .iter()
                .map(|v| v.to_string().len())
                .max()
                .unwrap_or(0)
        } else {
            0
        };
        let rendered: Vec<String> = values
            .iter()
            .map(|v| {
                if equal_width {
                    format!("{:0>width$}", v.to_string(), width = width)
                } else {
                    v.to_string()
                }
            })
            .collect();

        let mut out = rendered.join(&separator);
        if !out.is_empty() {
            out.push('\n');
        }
        CommandResult::success(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::ctx;

    #[tokio::test]
    async fn test_seq_single_operand() {
        let result = SeqCommand.execute(ctx(vec!["3"])).await;
        assert_eq!(result.stdout, "1\n2\n3\n");
    }

    #[tokio::test]
    async fn test_seq_first_last() {
        let result = SeqCommand.execute(ctx(vec!["2", "4"])).await;
        assert_eq!(result.stdout, "2\n3\n4\n");
    }

    #[tokio::test]
    async fn test_seq_with_increment() {
        let result = SeqCommand.execute(ctx(vec!["1", "2", "9"])).await;
        assert_eq!(result.stdout, "1\n3\n5\n7\n9\n");
    }

    #[tokio::test]
    async fn test_seq_descending() {
        let result = SeqCommand.execute(ctx(vec!["3", "-1", "1"])).await;
        assert_eq!(result.stdout, "3\n2\n1\n");
    }

    #[tokio::test]
    async fn test_seq_separator() {
        let result = SeqCommand.execute(ctx(vec!["-s", ",", "3"])).await;
        assert_eq!(result.stdout, "1,2,3\n");
    }

    #[tokio::test]
    async fn test_seq_equal_width() {
        let result = SeqCommand.execute(ctx(vec!["-w", "8", "10"])).await;
        assert_eq!(result.stdout, "08\n09\n10\n");
    }

    #[tokio::test]
    async fn test_seq_empty_range() {
        let result = SeqCommand.execute(ctx(vec!["5", "1"])).await;
        assert_eq!(result.stdout, "");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_seq_zero_increment() {
        let result = SeqCommand.execute(ctx(vec!["1", "0", "5"])).await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_seq_missing_operand() {
        let result = SeqCommand.execute(ctx(vec![])).await;
        assert_eq!(result.exit_code, 1);
    }
}
