//! Observer interface for peer lifecycle events.

use tracing::info;

use crate::event::{PeerAdded, PeerEvent, PeerKey};

/// Receives peer transitions from a running agent.
///
/// The agent calls these methods from its own event loop, one at a time and
/// in detection order, so implementations need no synchronisation. They run
/// on the agent's critical path and must return promptly: record or log the
/// event, never do long-running work here. There is no way to fail the agent
/// from an observer.
#[auto_impl::auto_impl(&mut, Box)]
pub trait PeerEventObserver: Send {
    /// A peer joined the overlay.
    fn handle_peer_added(&mut self, event: &PeerAdded);

    /// A peer left the overlay.
    fn handle_peer_removed(&mut self, key: &PeerKey);

    /// Route an event to the matching handler.
    fn observe(&mut self, event: &PeerEvent) {
        match event {
            PeerEvent::Added(added) => self.handle_peer_added(added),
            PeerEvent::Removed(key) => self.handle_peer_removed(key),
        }
    }
}

/// Observer used by `siderolink-launch`: logs added peers, ignores removals.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl PeerEventObserver for LoggingObserver {
    fn handle_peer_added(&mut self, event: &PeerAdded) {
        info!(address = %event.address, "agent sees peer added");
    }

    fn handle_peer_removed(&mut self, _key: &PeerKey) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::KEY_LEN, test_utils::capture_logs};

    fn added() -> PeerAdded {
        PeerAdded {
            address: "fd00::1".parse().unwrap(),
            key: PeerKey::new([1u8; KEY_LEN]),
        }
    }

    #[test]
    fn test_logging_observer_logs_address() {
        let logs = capture_logs(|| {
            LoggingObserver.observe(&PeerEvent::Added(added()));
        });

        assert!(logs.contains("agent sees peer added"), "logs: {logs}");
        assert!(logs.contains("address=fd00::1"), "logs: {logs}");
    }

    #[test]
    fn test_logging_observer_ignores_removal() {
        let logs = capture_logs(|| {
            LoggingObserver.observe(&PeerEvent::Removed(PeerKey::new([2u8; KEY_LEN])));
        });

        assert!(logs.is_empty(), "logs: {logs}");
    }

    #[test]
    fn test_observer_through_mut_ref_and_box() {
        let mut observer = LoggingObserver;
        let by_ref: &mut dyn PeerEventObserver = &mut observer;
        by_ref.handle_peer_removed(&PeerKey::new([0u8; KEY_LEN]));

        let mut boxed: Box<dyn PeerEventObserver> = Box::new(LoggingObserver);
        boxed.handle_peer_removed(&PeerKey::new([0u8; KEY_LEN]));
    }
}
