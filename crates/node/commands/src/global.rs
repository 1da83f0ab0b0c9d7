//! Flags accepted by every command.

use std::{ffi::OsString, path::PathBuf};

use clap::{Arg, Args};
use clap_complete::engine::{ArgValueCandidates, CompletionCandidate};
use nodectl_node_core::{args::LogArgs, config::ClientConfig};

use crate::registry::flags_of;

/// Connection flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
#[command(next_help_heading = "Global")]
pub struct GlobalArgs {
    /// The path to the client configuration file.
    #[arg(long = "nodeconfig", env = "NODECONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Context to be used in command.
    #[arg(long, value_name = "NAME")]
    pub context: Option<String>,

    /// Target the specified nodes.
    #[arg(short = 'n', long, value_delimiter = ',', value_name = "NODES")]
    pub nodes: Vec<String>,

    /// Override default endpoints in the client configuration.
    #[arg(short = 'e', long, value_delimiter = ',', value_name = "ENDPOINTS")]
    pub endpoints: Vec<String>,

    /// Cluster to connect to if a proxy endpoint is used.
    #[arg(long, value_name = "NAME")]
    pub cluster: Option<String>,
}

impl GlobalArgs {
    /// Every global flag, including the logging flags, with dynamic
    /// completion attached to `--context` and `--nodes`.
    pub fn flags() -> Vec<Arg> {
        flags_of::<GlobalArgs>()
            .into_iter()
            .map(|flag| match flag.get_id().as_str() {
                "context" => flag.add(ArgValueCandidates::new(complete_contexts)),
                "nodes" => flag.add(ArgValueCandidates::new(complete_nodes)),
                _ => flag,
            })
            .chain(flags_of::<LogArgs>())
            .collect()
    }
}

/// Config file named by a `--nodeconfig` on the line being completed.
///
/// Candidate callbacks only see the process arguments, which carry the
/// partial command line after `--` during completion.
fn nodeconfig_from_args(args: impl IntoIterator<Item = OsString>) -> Option<PathBuf> {
    let mut found = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let Some(arg) = arg.to_str() else { continue };
        if arg == "--nodeconfig" {
            found = args.next().map(PathBuf::from).or(found);
        } else if let Some(path) = arg.strip_prefix("--nodeconfig=") {
            found = Some(PathBuf::from(path));
        }
    }
    found
}

fn completion_config(args: impl IntoIterator<Item = OsString>) -> Option<ClientConfig> {
    let explicit = nodeconfig_from_args(args);
    ClientConfig::load_default(explicit.as_deref()).ok()
}

fn context_candidates(args: impl IntoIterator<Item = OsString>) -> Vec<CompletionCandidate> {
    completion_config(args)
        .map(|config| {
            config
                .context_names()
                .map(CompletionCandidate::new)
                .collect()
        })
        .unwrap_or_default()
}

fn node_candidates(args: impl IntoIterator<Item = OsString>) -> Vec<CompletionCandidate> {
    let Some(config) = completion_config(args) else {
        return Vec::new();
    };
    match config.current_context(None) {
        Ok((_, context)) => context.nodes.iter().map(CompletionCandidate::new).collect(),
        Err(_) => Vec::new(),
    }
}

fn complete_contexts() -> Vec<CompletionCandidate> {
    context_candidates(std::env::args_os())
}

fn complete_nodes() -> Vec<CompletionCandidate> {
    node_candidates(std::env::args_os())
}
