//! Command groups and the default command tree.

use std::{io::Write, sync::Arc};

use clap::Command;
use eyre::WrapErr;
use nodectl_link::Agent;
use nodectl_node_core::version;

use crate::{error::RegistryError, global::GlobalArgs, registry::CommandRegistry};

pub mod client;
pub mod mgmt;

/// Write command output. A closed pipe is an error, not a panic.
pub(crate) fn write_output(out: &mut dyn Write, text: &[u8]) -> eyre::Result<()> {
    out.write_all(text)
        .and_then(|()| out.flush())
        .wrap_err("failed to write output")
}

/// The top-level command, before any subcommand or flag is registered.
pub fn root_command() -> Command {
    Command::new("nodectl")
        .about("A CLI for out-of-band management of cluster nodes")
        .version(version::VERSION)
        .long_version(version::LONG_VERSION.as_str())
}

/// Every command group, with `siderolink-launch` driving `agent`.
pub fn default_registry(agent: Arc<dyn Agent>) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new(root_command());

    for flag in GlobalArgs::flags() {
        registry.register_global_flag(flag)?;
    }
    for node in client::commands()?.into_iter().chain(mgmt::commands(agent)) {
        registry.register(&[], node)?;
    }

    Ok(registry)
}
