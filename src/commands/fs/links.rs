use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub struct LnCommand;

#[async_trait]
impl Command for LnCommand {
    fn name(&self) -> &'static str {
        "ln"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut symbolic = false;
        let mut force = false;
        let mut paths: Vec<&String> = Vec::new();
        for arg in &ctx.args {
            match arg.as_str() {
                "-s" | "--symbolic" => symbolic = true,
                "-f" | "--force" => force = true,
                "-sf" | "-fs" => {
                    symbolic = true;
                    force = true;
                }
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("ln: invalid option -- '{}'\n", a))
                }
                _ => paths.push(arg),
            }
        }
        let [target, link_path] = paths.as_slice() else {
            return CommandResult::error("ln: missing file operand\n".to_string());
        };
        let fs = match ctx.require_fs("ln") {
            Ok(fs) => fs,
            Err(e) => return e,
        };

        let link_resolved = ctx.resolve(&fs, link_path);
        if force && fs.exists(&link_resolved).await {
            let _ = fs.rm(&link_resolved, crate::fs::RmOptions::default()).await;
        }

        let outcome = if symbolic {
            // The symlink target is stored verbatim; relative targets stay
            // relative to the link location.
            fs.symlink(target, &link_resolved).await
        } else {
            let target_resolved = ctx.resolve(&fs, target);
            fs.link(&target_resolved, &link_resolved).await
        };
        match outcome {
            Ok(()) => CommandResult::success(String::new()),
            Err(e) => CommandResult::error(format!(
                "ln: failed to create link '{}': {}\n",
                link_path, e
            )),
        }
    }
}

pub struct ChmodCommand;

#[async_trait]
impl Command for ChmodCommand {
    fn name(&self) -> &'static str {
        "chmod"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let operands: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        let [mode_text, paths @ ..] = operands.as_slice() else {
            return CommandResult::error("chmod: missing operand\n".to_string());
        };
        if paths.is_empty() {
            return CommandResult::error("chmod: missing operand\n".to_string());
        }

        // Octal only; symbolic modes are out of scope on purpose.
        let Ok(mode) = u32::from_str_radix(mode_text, 8) else {
            return CommandResult::error(format!(
                "chmod: invalid mode: '{}' (symbolic modes are not supported; use octal)\n",
                mode_text
            ));
        };

        let fs = match ctx.require_fs("chmod") {
            Ok(fs) => fs,
            Err(e) => return e,
        };
        let mut err = String::new();
        let mut exit_code = 0;
        for path in paths {
            let resolved = ctx.resolve(&fs, path);
            if let Err(e) = fs.chmod(&resolved, mode).await {
                err.push_str(&format!("chmod: cannot access '{}': {}\n", path, e));
                exit_code = 1;
            }
        }
        CommandResult::with_exit_code(String::new(), err, exit_code)
    }
}

pub struct ChownCommand;

#[async_trait]
impl Command for ChownCommand {
    fn name(&self) -> &'static str {
        "chown"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let operands: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        let [owner_spec, paths @ ..] = operands.as_slice() else {
            return CommandResult::error("chown: missing operand\n".to_string());
        };
        if paths.is_empty() {
            return CommandResult::error("chown: missing operand\n".to_string());
        }

        let (uid_text, gid_text) = match owner_spec.split_once(':') {
            Some((u, g)) => (u, Some(g)),
            None => (owner_spec.as_str(), None),
        };
        let Ok(uid) = uid_text.parse::<u32>() else {
            return CommandResult::error(format!(
                "chown: invalid user: '{}' (numeric ids only)\n",
                owner_spec
            ));
        };
        let gid = match gid_text {
            Some(g) => match g.parse::<u32>() {
                Ok(gid) => gid,
                Err(_) => {
                    return CommandResult::error(format!(
                        "chown: invalid group: '{}' (numeric ids only)\n",
                        owner_spec
                    ))
                }
            },
            None => uid,
        };

        let fs = match ctx.require_fs("chown") {
            Ok(fs) => fs,
            Err(e) => return e,
        };
        let mut err = String::new();
        let mut exit_code = 0;
        for path in paths {
            let resolved = ctx.resolve(&fs, path);
            if let Err(e) = fs.chown(&resolved, uid, gid).await {
                err.push_str(&format!("chown: cannot access '{}': {}\n", path, e));
                exit_code = 1;
            }
        }
        CommandResult::with_exit_code(String::new(), err, exit_code)
    }
}
