//! Turning process signals into cancellation.

use std::{future::Future, io};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Child of `parent` that is also cancelled by the first interrupt (SIGINT).
///
/// The listener is registered before this returns, so an interrupt arriving
/// right after cannot kill the process. Cancelling the returned token, or
/// `parent`, stops the listener.
pub fn interrupt_token(parent: &CancellationToken) -> io::Result<CancellationToken> {
    #[cfg(unix)]
    let interrupt = {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        async move {
            sigint.recv().await;
        }
    };

    #[cfg(not(unix))]
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            debug!(%err, "interrupt listener failed");
            std::future::pending::<()>().await;
        }
    };

    Ok(cancel_on(parent, interrupt))
}

/// Child of `parent` cancelled when `signal` completes.
pub fn cancel_on<F>(parent: &CancellationToken, signal: F) -> CancellationToken
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = parent.child_token();
    let watched = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = watched.cancelled() => {
                debug!("interrupt listener released");
            }
            _ = signal => {
                info!("interrupt received, shutting down");
                watched.cancel();
            }
        }
    });

    token
}
