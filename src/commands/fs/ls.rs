use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct LsCommand;

#[async_trait]
impl Command for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut show_hidden = false;
        let mut directory_itself = false;
        let mut paths: Vec<String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-a" | "--all" => show_hidden = true,
                "-1" => {}
                "-d" => directory_itself = true,
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("ls: invalid option -- '{}'\n", a))
                }
                a => paths.push(a.to_string()),
            }
        }
        if paths.is_empty() {
            paths.push(ctx.cwd.clone());
        }

        let fs = match ctx.require_fs("ls") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let mut out = String::new();
        let mut err = String::new();
        let mut exit_code = 0;
        let many = paths.len() > 1;

        for (i, path) in paths.iter().enumerate() {
            let resolved = ctx.resolve(&fs, path);
            let stat = match fs.stat(&resolved).await {
                Ok(s) => s,
                Err(_) => {
                    err.push_str(&format!("ls: cannot access '{}': No such file or directory\n", path));
                    exit_code = 2;
                    continue;
                }
            };

            if !stat.is_directory() || directory_itself {
                out.push_str(path);
                out.push('\n');
                continue;
            }

            if many {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&format!("{}:\n", path));
            }
            match fs.list(&resolved).await {
                Ok(names) => {
                    for name in names {
                        if !show_hidden && name.starts_with('.') {
                            continue;
                        }
                        out.push_str(&name);
                        out.push('\n');
                    }
                }
                Err(e) => {
                    err.push_str(&format!("ls: {}: {}\n", path, e));
                    exit_code = 2;
                }
            }
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}
