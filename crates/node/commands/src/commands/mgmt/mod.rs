//! Commands that act on the local machine.

use std::sync::Arc;

use nodectl_link::Agent;

use crate::registry::CommandNode;

pub mod completion;
pub mod siderolink;

pub fn commands(agent: Arc<dyn Agent>) -> Vec<CommandNode> {
    vec![completion::command(), siderolink::command(agent)]
}
