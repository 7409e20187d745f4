use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct DdCommand;

#[derive(Debug, Clone, Default)]
struct DdOptions {
    input_file: Option<String>,
    output_file: Option<String>,
    block_size: Option<usize>,
    input_block_size: Option<usize>,
    output_block_size: Option<usize>,
    count: Option<usize>,
    skip: usize,
    seek: usize,
    conv_ucase: bool,
    conv_lcase: bool,
}

#[async_trait]
impl Command for DdCommand {
    fn name(&self) -> &'static str {
        "dd"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut opts = DdOptions::default();
        for arg in &ctx.args {
            let Some((key, value)) = arg.split_once('=') else {
                return CommandResult::error(format!("dd: unrecognized operand '{}'\n", arg));
            };
            match key {
                "if" => opts.input_file = Some(value.to_string()),
                "of" => opts.output_file = Some(value.to_string()),
                "bs" => opts.block_size = parse_size(value),
                "ibs" => opts.input_block_size = parse_size(value),
                "obs" => opts.output_block_size = parse_size(value),
                "count" => opts.count = value.parse().ok(),
                "skip" => opts.skip = value.parse().unwrap_or(0),
                "seek" => opts.seek = value.parse().unwrap_or(0),
                "conv" => {
                    for conv in value.split(',') {
                        match conv {
                            "ucase" => opts.conv_ucase = true,
                            "lcase" => opts.conv_lcase = true,
                            other => {
                                return CommandResult::error(format!(
                                    "dd: unsupported conversion: '{}'\n",
                                    other
                                ))
                            }
                        }
                    }
                }
                other => {
                    return CommandResult::error(format!("dd: unrecognized operand '{}'\n", other))
                }
            }
        }

        let bs = opts.block_size;
        let ibs = bs.or(opts.input_block_size).unwrap_or(512);
        let _obs = bs.or(opts.output_block_size).unwrap_or(512);

        // Gather input
        let input: Vec<u8> = match &opts.input_file {
            Some(path) => {
                let fs = match ctx.require_fs("dd") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, path);
                match fs.read_bytes(&resolved).await {
                    Ok(bytes) => bytes,
                    Err(e) => return CommandResult::error(format!("dd: {}\n", e)),
                }
            }
            None => ctx.stdin.as_bytes().to_vec(),
        };

        // skip= skips input blocks, count= limits blocks copied.
        let start = (opts.skip * ibs).min(input.len());
        let end = match opts.count {
            Some(count) => (start + count * ibs).min(input.len()),
            None => input.len(),
        };
        let mut data = input[start..end].to_vec();

        if opts.conv_ucase {
            data = String::from_utf8_lossy(&data).to_uppercase().into_bytes();
        } else if opts.conv_lcase {
            data = String::from_utf8_lossy(&data).to_lowercase().into_bytes();
        }

        let full_blocks = data.len() / ibs;
        let partial = usize::from(data.len() % ibs != 0);
        let stderr = format!(
            "{}+{} records in\n{}+{} records out\n{} bytes copied\n",
            full_blocks,
            partial,
            full_blocks,
            partial,
            data.len()
        );

        match &opts.output_file {
            Some(path) => {
                let fs = match ctx.require_fs("dd") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, path);
                // seek= zero-pads the front of the output file.
                let mut out_bytes = vec![0u8; opts.seek * ibs];
                out_bytes.extend_from_slice(&data);
                if let Err(e) = fs.write(&resolved, &out_bytes).await {
                    return CommandResult::error(format!("dd: {}: {}\n", path, e));
                }
                CommandResult::with_exit_code(String::new(), stderr, 0)
            }
            None => CommandResult::with_exit_code(
                String::from_utf8_lossy(&data).to_string(),
                stderr,
                0,
            ),
        }
    }
}

fn parse_size(value: &str) -> Option<usize> {
    let (digits, multiplier) = match value.chars().last() {
        Some('k') | Some('K') => (&value[..value.len() - 1], 1024),
        Some('M') => (&value[..value.len() - 1], 1024 * 1024),
        Some('b') => (&value[..value.len() - 1], 512),
        _ => (value, 1),
    };
    digits.parse::<usize>().ok().map(|n| n * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{ctx_with_files, ctx_with_stdin};
    use crate::fs::FsCapability;

    #[tokio::test]
    async fn test_dd_stdin_to_stdout() {
        let result = DdCommand.execute(ctx_with_stdin(vec![], "hello")).await;
        assert_eq!(result.stdout, "hello");
        assert!(result.stderr.contains("records in"));
        assert!(result.stderr.contains("5 bytes copied"));
    }

    #[tokio::test]
    async fn test_dd_count_and_bs() {
        let result = DdCommand
            .execute(ctx_with_stdin(vec!["bs=2", "count=2"], "abcdefgh"))
            .await;
        assert_eq!(result.stdout, "abcd");
        assert!(result.stderr.starts_with("2+0 records in"));
    }

    #[tokio::test]
    async fn test_dd_skip() {
        let result = DdCommand
            .execute(ctx_with_stdin(vec!["bs=2", "skip=1"], "abcdef"))
            .await;
        assert_eq!(result.stdout, "cdef");
    }

    #[tokio::test]
    async fn test_dd_conv_ucase() {
        let result = DdCommand
            .execute(ctx_with_stdin(vec!["conv=ucase"], "abc"))
            .await;
        assert_eq!(result.stdout, "ABC");
    }

    #[tokio::test]
    async fn test_dd_file_to_file() {
        let c = ctx_with_files(vec!["if=/in.txt", "of=/out.txt"], &[("/in.txt", "data")]).await;
        let fs = c.fs.clone().unwrap();
        let result = DdCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read("/out.txt").await.unwrap(), "data");
    }

    #[tokio::test]
    async fn test_dd_seek_zero_pads() {
        let c = ctx_with_files(vec!["bs=1", "seek=2", "of=/out.bin"], &[]).await;
        let mut c = c;
        c.stdin = "xy".to_string();
        let fs = c.fs.clone().unwrap();
        let result = DdCommand.execute(c).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(fs.read_bytes("/out.bin").await.unwrap(), b"\0\0xy");
    }

    #[tokio::test]
    async fn test_dd_missing_input_file() {
        let c = ctx_with_files(vec!["if=/none"], &[]).await;
        let result = DdCommand.execute(c).await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_dd_bad_operand() {
        let result = DdCommand.execute(ctx_with_stdin(vec!["frob"], "")).await;
        assert_eq!(result.exit_code, 1);
    }
}
