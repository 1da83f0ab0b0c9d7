//! `config`: inspect the client configuration.

use std::{fmt::Write as _, io};

use async_trait::async_trait;
use clap::{ArgMatches, Command};
use eyre::WrapErr;
use nodectl_node_core::config::ClientConfig;

use crate::{
    commands::write_output,
    context::{CommandContext, CommandHandler},
    error::{CommandError, RegistryError},
    global::GlobalArgs,
    registry::CommandNode,
};

fn load(global: &GlobalArgs) -> eyre::Result<ClientConfig> {
    ClientConfig::load_default(global.config.as_deref())
        .wrap_err("failed to read client configuration")
}

/// `config contexts`: list contexts, marking the current one.
pub struct Contexts;

#[async_trait]
impl CommandHandler for Contexts {
    async fn run(&self, ctx: &CommandContext<'_>, _: &ArgMatches) -> Result<(), CommandError> {
        let config = load(ctx.global())?;
        let out = render_contexts(&config, ctx.global().context.as_deref());
        write_output(&mut io::stdout().lock(), out.as_bytes())?;
        Ok(())
    }
}

fn render_contexts(config: &ClientConfig, selected: Option<&str>) -> String {
    let current = selected.or(config.context.as_deref());
    let mut out = String::from("CURRENT   NAME\n");
    for name in config.context_names() {
        let marker = if Some(name) == current { "*" } else { "" };
        let _ = writeln!(out, "{marker:<10}{name}");
    }
    out
}

/// `config info`: the effective target after applying global flags.
pub struct Info;

#[async_trait]
impl CommandHandler for Info {
    async fn run(&self, ctx: &CommandContext<'_>, _: &ArgMatches) -> Result<(), CommandError> {
        let config = load(ctx.global())?;
        let out = render_info(&config, ctx.global())?;
        write_output(&mut io::stdout().lock(), out.as_bytes())?;
        Ok(())
    }
}

fn render_info(config: &ClientConfig, global: &GlobalArgs) -> eyre::Result<String> {
    let (name, context) = config.current_context(global.context.as_deref())?;

    let pick = |flag: &[String], file: &[String]| -> String {
        let values = if flag.is_empty() { file } else { flag };
        values.join(", ")
    };
    let cluster = global
        .cluster
        .as_deref()
        .or(context.cluster.as_deref())
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "Current context:     {name}");
    let _ = writeln!(out, "Nodes:               {}", pick(&global.nodes, &context.nodes));
    let _ = writeln!(out, "Endpoints:           {}", pick(&global.endpoints, &context.endpoints));
    let _ = writeln!(out, "Cluster:             {cluster}");
    Ok(out)
}

pub fn command() -> Result<CommandNode, RegistryError> {
    CommandNode::group(Command::new("config").about("Manage the client configuration file"))
        .with_child(CommandNode::leaf(
            Command::new("contexts").about("List defined contexts"),
            Contexts,
        ))?
        .with_child(CommandNode::leaf(
            Command::new("info").about("Show information about the current context"),
            Info,
        ))
}
