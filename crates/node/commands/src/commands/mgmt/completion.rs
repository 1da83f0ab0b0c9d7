//! `completion <shell>`: static completion scripts.

use std::io;

use async_trait::async_trait;
use clap::{ArgMatches, Args, Command, FromArgMatches};
use clap_complete::{Shell, generate};

use crate::{
    commands::write_output,
    context::{CommandContext, CommandHandler},
    error::CommandError,
    registry::CommandNode,
};

#[derive(Debug, Clone, Args)]
pub struct CompletionArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

pub struct Completion;

#[async_trait]
impl CommandHandler for Completion {
    async fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<(), CommandError> {
        let args = CompletionArgs::from_arg_matches(matches)?;
        let mut root = ctx.root().clone();
        let name = root.get_name().to_string();
        let mut script = Vec::new();
        generate(args.shell, &mut root, name, &mut script);
        write_output(&mut io::stdout().lock(), &script)?;
        Ok(())
    }
}

pub fn command() -> CommandNode {
    let command = Command::new("completion")
        .about("Output shell completion code for the specified shell")
        .long_about(
            "Output shell completion code for the specified shell.\n\n\
             For completions that read contexts and nodes from the client \
             configuration, source the dynamic registration instead:\n  \
             source <(COMPLETE=bash nodectl)",
        );
    CommandNode::leaf(CompletionArgs::augment_args(command), Completion)
}
