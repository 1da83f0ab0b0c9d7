//! Launching an agent and mapping its outcome.

use eyre::WrapErr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{agent::Agent, config::AgentConfig, observer::PeerEventObserver};

/// Run `agent` until `shutdown` is cancelled or the agent fails.
///
/// Cancellation is a clean exit: once `shutdown` has fired, whatever the
/// agent returns is reported as success. Any other failure is wrapped with
/// the subsystem it came from. Nothing is retried.
pub async fn launch(
    agent: &dyn Agent,
    shutdown: CancellationToken,
    config: AgentConfig,
    observer: &mut dyn PeerEventObserver,
) -> eyre::Result<()> {
    info!("starting embedded siderolink agent");

    let result = agent.run(shutdown.clone(), config, observer).await;

    info!("stopping embedded siderolink agent");

    match result {
        Err(err) if shutdown.is_cancelled() => {
            debug!(%err, "agent error after shutdown ignored");
            Ok(())
        }
        result => result.wrap_err("failed to run siderolink agent"),
    }
}
