//! Compute-class commands: pure utilities with no filesystem or network
//! dependency.

pub mod arith;
pub mod echo;
pub mod expr_cmd;
pub mod printf_cmd;
pub mod seq;
pub mod timeout_cmd;

use async_trait::async_trait;

use super::registry::CommandRegistry;
use super::types::{Command, CommandContext, CommandResult};

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(TrueCommand));
    reg.register(Box::new(FalseCommand));
    reg.register(Box::new(PwdCommand));
    reg.register(Box::new(RevCommand));
    reg.register(Box::new(echo::EchoCommand));
    reg.register(Box::new(printf_cmd::PrintfCommand));
    reg.register(Box::new(seq::SeqCommand));
    reg.register(Box::new(expr_cmd::ExprCommand));
    reg.register(Box::new(expr_cmd::BcCommand));
    reg.register(Box::new(timeout_cmd::SleepCommand));
    reg.register(Box::new(timeout_cmd::TimeoutCommand));
}

pub struct TrueCommand;

#[async_trait]
impl Command for TrueCommand {
    fn name(&self) -> &'static str {
        "true"
    }

    async fn execute(&self, _ctx: CommandContext) -> CommandResult {
        CommandResult::success(String::new())
    }
}

pub struct FalseCommand;

#[async_trait]
impl Command for FalseCommand {
    fn name(&self) -> &'static str {
        "false"
    }

    async fn execute(&self, _ctx: CommandContext) -> CommandResult {
        CommandResult::with_exit_code(String::new(), String::new(), 1)
    }
}

pub struct PwdCommand;

#[async_trait]
impl Command for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        CommandResult::success(format!("{}\n", ctx.cwd))
    }
}

pub struct RevCommand;

#[async_trait]
impl Command for RevCommand {
    fn name(&self) -> &'static str {
        "rev"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut out = String::new();
        for line in ctx.stdin.lines() {
            out.push_str(&line.chars().rev().collect::<String>());
            out.push('\n');
        }
        CommandResult::success(out)
    }
}
