//! `siderolink-launch`: runs the embedded link agent until interrupted.

use std::sync::Arc;

use async_trait::async_trait;
use clap::{ArgMatches, Args, Command, FromArgMatches};
use nodectl_link::{
    Agent, AgentConfig, LoggingObserver, PeerEventObserver, PredefinedPair, launch,
};
use tokio::sync::Mutex;

use crate::{
    context::{CommandContext, CommandHandler},
    error::CommandError,
    registry::CommandNode,
};

pub const NAME: &str = "siderolink-launch";

/// Hidden flags of `siderolink-launch`. All of them are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct SiderolinkArgs {
    /// Join token for the link API.
    #[arg(long = "sidero-link-join-token", hide = true)]
    pub join_token: Option<String>,

    /// Wireguard endpoint of the link.
    #[arg(long = "sidero-link-wireguard-endpoint", hide = true)]
    pub wireguard_endpoint: Option<String>,

    /// Event sink endpoint.
    #[arg(long = "event-sink-endpoint", hide = true)]
    pub sink_endpoint: Option<String>,

    /// Link API endpoint.
    #[arg(long = "sidero-link-api-endpoint", hide = true)]
    pub api_endpoint: Option<String>,

    /// Log receiver endpoint.
    #[arg(long = "log-receiver-endpoint", hide = true)]
    pub log_endpoint: Option<String>,

    /// Predefined UUID=IPv6 pair, repeatable.
    #[arg(long = "predefined-pair", value_name = "UUID=IPV6", hide = true)]
    pub predefined_pairs: Vec<PredefinedPair>,
}

impl SiderolinkArgs {
    /// Agent configuration for these flags. The userspace transport is always
    /// forced.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            wireguard_endpoint: self.wireguard_endpoint.clone().unwrap_or_default(),
            api_endpoint: self.api_endpoint.clone().unwrap_or_default(),
            join_token: self.join_token.clone().unwrap_or_default(),
            sink_endpoint: self.sink_endpoint.clone().unwrap_or_default(),
            log_endpoint: self.log_endpoint.clone().unwrap_or_default(),
            predefined_pairs: self.predefined_pairs.clone(),
            force_userspace: true,
        }
    }
}

/// Handler running `agent` until the invocation's shutdown token fires.
///
/// Peer events go to `observer`, a [`LoggingObserver`] unless another one
/// is supplied.
pub struct SiderolinkLaunch<O = LoggingObserver> {
    agent: Arc<dyn Agent>,
    observer: Arc<Mutex<O>>,
}

impl SiderolinkLaunch {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self::with_observer(agent, Arc::new(Mutex::new(LoggingObserver)))
    }
}

impl<O> SiderolinkLaunch<O> {
    pub fn with_observer(agent: Arc<dyn Agent>, observer: Arc<Mutex<O>>) -> Self {
        Self { agent, observer }
    }
}

#[async_trait]
impl<O: PeerEventObserver + 'static> CommandHandler for SiderolinkLaunch<O> {
    async fn run(&self, ctx: &CommandContext<'_>, matches: &ArgMatches) -> Result<(), CommandError> {
        let args = SiderolinkArgs::from_arg_matches(matches)?;
        let mut observer = self.observer.lock().await;

        launch(
            self.agent.as_ref(),
            ctx.shutdown().child_token(),
            args.agent_config(),
            &mut *observer,
        )
        .await?;

        Ok(())
    }
}

fn leaf_command() -> Command {
    let command = Command::new(NAME)
        .about("Internal command used by cluster create to launch siderolink agent")
        .long_about(None)
        .hide(true);
    SiderolinkArgs::augment_args(command)
}

pub fn command(agent: Arc<dyn Agent>) -> CommandNode {
    CommandNode::leaf(leaf_command(), SiderolinkLaunch::new(agent))
}

/// Same command, reporting peer events to `observer`.
pub fn command_with_observer<O: PeerEventObserver + 'static>(
    agent: Arc<dyn Agent>,
    observer: Arc<Mutex<O>>,
) -> CommandNode {
    CommandNode::leaf(leaf_command(), SiderolinkLaunch::with_observer(agent, observer))
}
