//! Command tree and dispatch for nodectl.
//!
//! - [`CommandRegistry`] - the command tree, built from [`CommandNode`]s
//! - [`GlobalArgs`] - flags accepted by every command
//! - [`Dispatcher`] - parses an invocation, runs the matched handler and
//!   reports the result
//! - [`commands`] - the command groups shipped with nodectl
//!
//! Errors carry an [`ErrorKind`]: only usage errors are followed by the
//! matched command's usage text.

pub mod commands;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod global;
pub mod registry;
pub mod signal;

pub use commands::{default_registry, root_command};
pub use context::{CommandContext, CommandHandler};
pub use dispatch::{Dispatcher, Outcome};
pub use error::{CommandError, ErrorKind, RegistryError};
pub use global::GlobalArgs;
pub use registry::{CommandNode, CommandRegistry};

use std::{io, process::ExitCode, sync::Arc};

use nodectl_link::EmbeddedAgent;
use tokio_util::sync::CancellationToken;

/// The full command tree backed by the embedded link agent.
///
/// The agent's device handle is dropped, so `siderolink-launch` runs until
/// interrupted.
pub fn default_tree() -> Result<CommandRegistry, RegistryError> {
    let (agent, _device) = EmbeddedAgent::new();
    default_registry(Arc::new(agent))
}

/// The assembled `clap::Command`, for shell completion.
pub fn cli_command() -> clap::Command {
    match default_tree() {
        Ok(registry) => registry.command(),
        Err(_) => root_command(),
    }
}

/// Run nodectl on the process arguments and return its exit code.
///
/// The interrupt listener is installed before anything else, so an
/// interrupt during startup cancels the invocation instead of killing the
/// process.
pub async fn run() -> ExitCode {
    let shutdown = match signal::interrupt_token(&CancellationToken::new()) {
        Ok(shutdown) => shutdown,
        Err(err) => {
            eprintln!("error: failed to listen for interrupts: {err}");
            return ExitCode::FAILURE;
        }
    };
    let _release = shutdown.clone().drop_guard();

    if let Err(err) = color_eyre::install() {
        eprintln!("error: {err}");
    }

    let registry = match default_tree() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("error: {}", CommandError::from(err));
            return ExitCode::FAILURE;
        }
    };

    let mut dispatcher = Dispatcher::new(registry, shutdown);
    let outcome = dispatcher.execute(std::env::args_os()).await;

    if let Err(err) = dispatcher.report(&outcome, &mut io::stdout().lock(), &mut io::stderr().lock())
    {
        tracing::debug!(%err, "failed to write command output");
    }
    outcome.exit_code()
}
