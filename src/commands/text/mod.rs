//! Text-processing commands.

pub mod awk;
pub mod diff_cmd;
pub mod patch_cmd;
pub mod sed;
pub mod tee;
pub mod xargs;

use super::registry::CommandRegistry;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(sed::SedCommand));
    reg.register(Box::new(awk::AwkCommand));
    reg.register(Box::new(diff_cmd::DiffCommand));
    reg.register(Box::new(patch_cmd::PatchCommand));
    reg.register(Box::new(tee::TeeCommand));
    reg.register(Box::new(xargs::XargsCommand));
}
