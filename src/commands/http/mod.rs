//! Http-class commands, backed by the embedder's fetch callback.

pub mod curl;

use super::registry::CommandRegistry;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(curl::CurlCommand));
    reg.register(Box::new(curl::WgetCommand));
}
