//! `version`: client build information.

use std::io;

use async_trait::async_trait;
use clap::{ArgMatches, Args, Command, FromArgMatches};
use nodectl_node_core::version;

use crate::{
    commands::write_output,
    context::{CommandContext, CommandHandler},
    error::CommandError,
    registry::CommandNode,
};

#[derive(Debug, Clone, Default, Args)]
pub struct VersionArgs {
    /// Print the short version.
    #[arg(long)]
    pub short: bool,
}

pub struct Version;

#[async_trait]
impl CommandHandler for Version {
    async fn run(&self, _ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<(), CommandError> {
        let args = VersionArgs::from_arg_matches(matches)?;
        let out = format!("{}\n", render(&args));
        write_output(&mut io::stdout().lock(), out.as_bytes())?;
        Ok(())
    }
}

fn render(args: &VersionArgs) -> String {
    if args.short {
        format!("Client v{}", version::VERSION)
    } else {
        format!("Client:\n{}", version::LONG_VERSION.as_str())
    }
}

pub fn command() -> CommandNode {
    let command = Command::new("version").about("Prints the version");
    CommandNode::leaf(VersionArgs::augment_args(command), Version)
}
