//! Commands about the client itself and its configuration.

use crate::{error::RegistryError, registry::CommandNode};

pub mod config;
pub mod version;

pub fn commands() -> Result<Vec<CommandNode>, RegistryError> {
    Ok(vec![config::command()?, version::command()])
}
