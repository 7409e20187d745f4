use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct CatCommand;

#[async_trait]
impl Command for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut number_lines = false;
        let mut files: Vec<&String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-n" => number_lines = true,
                "-" => files.push(arg),
                a if a.starts_with('-') && a.len() > 1 => {
                    return CommandResult::error(format!("cat: invalid option -- '{}'\n", a))
                }
                _ => files.push(arg),
            }
        }

        let mut out = String::new();
        let mut err = String::new();
        let mut exit_code = 0;

        if files.is_empty() {
            out.push_str(&ctx.stdin);
        } else {
            for file in files {
                if *file == "-" {
                    out.push_str(&ctx.stdin);
                    continue;
                }
                let fs = match ctx.require_fs("cat") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, file);
                match fs.read(&resolved).await {
                    Ok(content) => out.push_str(&content),
                    Err(_) => {
                        err.push_str(&format!("cat: {}: No such file or directory\n", file));
                        exit_code = 1;
                    }
                }
            }
        }

        if number_lines {
            let mut numbered = String::new();
            for (i, line) in out.lines().enumerate() {
                numbered.push_str(&format!("{:6}\t{}\n", i + 1, line));
            }
            out = numbered;
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}
