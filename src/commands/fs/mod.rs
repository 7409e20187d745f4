//! Fs-class commands. Every command here requires the filesystem
//! capability; the classifier guarantees it is configured before routing a
//! command into this class, but each command still degrades to a clear
//! error if invoked without one.

pub mod cat;
pub mod copy;
pub mod dirs;
pub mod find;
pub mod grep;
pub mod head_tail;
pub mod links;
pub mod ls;
pub mod remove;
pub mod stat_cmd;
pub mod test_cmd;
pub mod touch;

use super::registry::CommandRegistry;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(cat::CatCommand));
    reg.register(Box::new(ls::LsCommand));
    reg.register(Box::new(head_tail::HeadCommand));
    reg.register(Box::new(head_tail::TailCommand));
    reg.register(Box::new(test_cmd::TestCommand));
    reg.register_as("[", Box::new(test_cmd::TestCommand));
    reg.register(Box::new(stat_cmd::StatCommand));
    reg.register(Box::new(stat_cmd::ReadlinkCommand));
    reg.register(Box::new(find::FindCommand));
    reg.register(Box::new(grep::GrepCommand));
    reg.register(Box::new(dirs::MkdirCommand));
    reg.register(Box::new(dirs::RmdirCommand));
    reg.register(Box::new(remove::RmCommand));
    reg.register(Box::new(copy::CpCommand));
    reg.register(Box::new(copy::MvCommand));
    reg.register(Box::new(touch::TouchCommand));
    reg.register(Box::new(touch::TruncateCommand));
    reg.register(Box::new(links::LnCommand));
    reg.register(Box::new(links::ChmodCommand));
    reg.register(Box::new(links::ChownCommand));
}
