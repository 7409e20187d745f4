use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct MkdirCommand;

#[async_trait]
impl Command for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut recursive = false;
        let mut paths: Vec<&String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-p" | "--parents" => recursive = true,
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("mkdir: invalid option -- '{}'\n", a))
                }
                _ => paths.push(arg),
            }
        }
        if paths.is_empty() {
            return CommandResult::error("mkdir: missing operand\n".to_string());
        }
        let fs = match ctx.require_fs("mkdir") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut err = String::new();
        let mut exit_code = 0;
        for path in paths {
            let resolved = ctx.resolve(&fs, path);
            if let Err(e) = fs.mkdir(&resolved, recursive).await {
                err.push_str(&format!("mkdir: cannot create directory '{}': {}\n", path, e));
                exit_code = 1;
            }
        }
        CommandResult::with_exit_code(String::new(), err, exit_code)
    }
}

pub struct RmdirCommand;

#[async_trait]
impl Command for RmdirCommand {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let paths: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        if paths.is_empty() {
            return CommandResult::error("rmdir: missing operand\n".to_string());
        }
        let fs = match ctx.require_fs("rmdir") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut err = String::new();
        let mut exit_code = 0;
        for path in paths {
            let resolved = ctx.resolve(&fs, path);
            if let Err(e) = fs.rmdir(&resolved).await {
                err.push_str(&format!("rmdir: failed to remove '{}': {}\n", path, e));
                exit_code = 1;
            }
        }
        CommandResult::with_exit_code(String::new(), err, exit_code)
    }
}
