//! Parsing an invocation, running the matched command and reporting the
//! result.

use std::{
    ffi::OsString,
    io::{self, Write},
    process::ExitCode,
};

use clap::{ArgMatches, Command, FromArgMatches, error::ErrorKind as ClapErrorKind};
use nodectl_node_core::{args::LogArgs, logging};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    context::CommandContext,
    error::CommandError,
    global::GlobalArgs,
    registry::{CommandNode, CommandRegistry},
};

/// Result of one invocation.
#[derive(Debug)]
pub struct Outcome {
    /// Names of the matched commands below the root, outermost first.
    pub path: Vec<String>,
    pub result: Result<(), CommandError>,
    /// Help or version text requested by the user.
    pub display: Option<String>,
}

impl Outcome {
    fn failed(path: Vec<String>, err: CommandError) -> Self {
        Self {
            path,
            result: Err(err),
            display: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Runs invocations against a [`CommandRegistry`].
#[derive(Debug)]
pub struct Dispatcher {
    registry: CommandRegistry,
    shutdown: CancellationToken,
    init_logging: bool,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry, shutdown: CancellationToken) -> Self {
        Self {
            registry,
            shutdown,
            init_logging: true,
        }
    }

    /// Leave subscriber installation to the caller.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Parse `args` (program name first) and run the matched leaf.
    pub async fn execute<I, T>(&mut self, args: I) -> Outcome
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        if let Err(err) = self.registry.seal() {
            return Outcome::failed(Vec::new(), err.into());
        }
        let command = self.registry.command();
        let path = resolve(&command, &args);

        let matches = match command.clone().try_get_matches_from(&args) {
            Ok(matches) => matches,
            Err(err) => return self.parse_failure(path, err),
        };

        let (path, node, leaf) = walk(self.registry.root(), &matches);

        if self.init_logging {
            match LogArgs::from_arg_matches(leaf) {
                Ok(logs) => {
                    logging::init_logging(&logs);
                }
                Err(err) => debug!(%err, "logging flags unavailable"),
            }
        }

        let Some(handler) = node.handler() else {
            return self.help(path);
        };

        let global = match GlobalArgs::from_arg_matches(leaf) {
            Ok(global) => global,
            Err(err) => return Outcome::failed(path, err.into()),
        };

        debug!(command = %display_path(&command, &path), "dispatching");
        let ctx = CommandContext::new(&global, &command, self.shutdown.clone());
        let result = handler.run(&ctx, leaf).await;

        Outcome {
            path,
            result,
            display: None,
        }
    }

    /// A command group invoked without a subcommand shows its help, like an
    /// explicit `--help`.
    fn parse_failure(&self, path: Vec<String>, err: clap::Error) -> Outcome {
        match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => Outcome {
                path,
                result: Ok(()),
                display: Some(err.to_string()),
            },
            ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ClapErrorKind::MissingSubcommand => self.help(path),
            _ => Outcome::failed(path, err.into()),
        }
    }

    fn help(&self, path: Vec<String>) -> Outcome {
        let mut display = self.usage(&path);
        if !display.ends_with('\n') {
            display.push('\n');
        }
        Outcome {
            path,
            result: Ok(()),
            display: Some(display),
        }
    }

    /// Help text of the command at `path`, as shown after a usage error.
    pub fn usage(&self, path: &[String]) -> String {
        let mut current = self.registry.command();
        current.build();
        for name in path {
            match current.find_subcommand(name).cloned() {
                Some(sub) => current = sub,
                None => break,
            }
        }
        current.render_help().to_string()
    }

    /// Write `outcome` to the given streams.
    ///
    /// Help and version text go to `stdout`. Errors go to `stderr`, followed
    /// by the matched command's usage only for usage errors.
    pub fn report(
        &self,
        outcome: &Outcome,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> io::Result<()> {
        if let Some(text) = &outcome.display {
            write!(stdout, "{text}")?;
            stdout.flush()?;
        }
        if let Err(err) = &outcome.result {
            writeln!(stderr, "error: {err}")?;
            if err.shows_usage() {
                writeln!(stderr)?;
                write!(stderr, "{}", self.usage(&outcome.path))?;
            }
            stderr.flush()?;
        }
        Ok(())
    }
}


fn display_path(root: &Command, path: &[String]) -> String {
    std::iter::once(root.get_name())
        .chain(path.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Follow the matched subcommands down to the deepest registered node.
fn walk<'n, 'm>(
    root: &'n CommandNode,
    matches: &'m ArgMatches,
) -> (Vec<String>, &'n CommandNode, &'m ArgMatches) {
    let mut path = Vec::new();
    let (mut node, mut matches) = (root, matches);
    while let Some((name, sub)) = matches.subcommand() {
        let Some(child) = node.child(name) else { break };
        path.push(name.to_string());
        node = child;
        matches = sub;
    }
    (path, node, matches)
}

/// Commands named by `args`, matched greedily from the root.
///
/// Flags are skipped along with their values. Matching stops at the first
/// positional argument that is not a subcommand of the current command, so
/// this also works for invocations that fail to parse.
pub fn resolve(root: &Command, args: &[OsString]) -> Vec<String> {
    let mut path = Vec::new();
    let mut scopes = vec![root];
    let mut args = args.iter().skip(1);

    while let Some(arg) = args.next() {
        let Some(arg) = arg.to_str() else { break };
        if arg == "--" {
            break;
        }
        if let Some(long) = arg.strip_prefix("--") {
            if !long.contains('=') && takes_value(&scopes, |flag| flag.get_long() == Some(long)) {
                args.next();
            }
            continue;
        }
        if let Some(shorts) = arg.strip_prefix('-').filter(|s| !s.is_empty()) {
            // In a cluster like `-vn`, the first value-taking flag consumes
            // the rest of the cluster, or the next argument when it is last.
            let value_flag = shorts
                .char_indices()
                .find(|(_, short)| takes_value(&scopes, |flag| flag.get_short() == Some(*short)));
            if let Some((at, short)) = value_flag {
                if at + short.len_utf8() == shorts.len() {
                    args.next();
                }
            }
            continue;
        }

        let Some(current) = scopes.last().copied() else { break };
        match current.find_subcommand(arg) {
            Some(sub) => {
                path.push(sub.get_name().to_string());
                scopes.push(sub);
            }
            None => break,
        }
    }

    path
}

fn takes_value(scopes: &[&Command], matches: impl Fn(&clap::Arg) -> bool) -> bool {
    scopes
        .iter()
        .rev()
        .flat_map(|command| command.get_arguments())
        .find(|flag| matches(flag))
        .is_some_and(|flag| flag.get_action().takes_values())
}
