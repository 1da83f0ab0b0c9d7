//! What a handler sees when it runs.

use async_trait::async_trait;
use clap::ArgMatches;
use tokio_util::sync::CancellationToken;

use crate::{error::CommandError, global::GlobalArgs};

/// Per-invocation state handed to a [`CommandHandler`].
#[derive(Debug)]
pub struct CommandContext<'a> {
    global: &'a GlobalArgs,
    root: &'a clap::Command,
    shutdown: CancellationToken,
}

impl<'a> CommandContext<'a> {
    pub fn new(global: &'a GlobalArgs, root: &'a clap::Command, shutdown: CancellationToken) -> Self {
        Self { global, root, shutdown }
    }

    /// Values of the global flags, wherever they appeared on the command line.
    pub fn global(&self) -> &GlobalArgs {
        self.global
    }

    /// The assembled root command, for handlers that introspect the tree.
    pub fn root(&self) -> &clap::Command {
        self.root
    }

    /// Root cancellation token for this invocation.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}

/// Behaviour attached to a leaf command.
///
/// `matches` holds the leaf's own arguments. Errors built with
/// [`CommandError::usage`] are shown with the command's usage; anything else
/// is reported as an operational failure.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<(), CommandError>;
}
