//! The agent interface and the embedded agent.

use std::net::IpAddr;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::AgentConfig,
    error::AgentError,
    event::PeerKey,
    observer::PeerEventObserver,
    peers::PeerTable,
};

/// Capacity of the device event channel.
const DEVICE_CHANNEL_CAPACITY: usize = 256;

/// A long-running overlay agent.
///
/// `run` returns once `shutdown` is cancelled and the agent has stopped, or
/// when the agent fails. Peer transitions are reported to `observer`
/// synchronously from the agent's loop.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(
        &self,
        shutdown: CancellationToken,
        config: AgentConfig,
        observer: &mut dyn PeerEventObserver,
    ) -> Result<(), AgentError>;
}

/// How the tunnel is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransportMode {
    /// Kernel WireGuard module (requires privileges).
    Kernel,
    /// Userspace implementation.
    Userspace,
}

impl TransportMode {
    pub fn for_config(config: &AgentConfig) -> Self {
        if config.force_userspace {
            Self::Userspace
        } else {
            Self::Kernel
        }
    }
}

/// Report from the tunnel device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A peer completed a handshake.
    PeerUp { key: PeerKey, address: IpAddr },
    /// A peer expired or was removed.
    PeerDown { key: PeerKey },
    /// The device stopped working.
    Failed(String),
}

/// Sending half used by the tunnel device to feed the agent.
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    tx: mpsc::Sender<DeviceEvent>,
}

impl DeviceHandle {
    /// Queue a device event. Fails if the agent has been dropped.
    pub async fn send(&self, event: DeviceEvent) -> Result<(), AgentError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| AgentError::Device("agent is gone".to_string()))
    }

    pub async fn peer_up(&self, key: PeerKey, address: IpAddr) -> Result<(), AgentError> {
        self.send(DeviceEvent::PeerUp { key, address }).await
    }

    pub async fn peer_down(&self, key: PeerKey) -> Result<(), AgentError> {
        self.send(DeviceEvent::PeerDown { key }).await
    }
}

/// In-process agent fed by a tunnel device through a [`DeviceHandle`].
#[derive(Debug)]
pub struct EmbeddedAgent {
    device: Mutex<Option<mpsc::Receiver<DeviceEvent>>>,
}

impl EmbeddedAgent {
    pub fn new() -> (Self, DeviceHandle) {
        let (tx, rx) = mpsc::channel(DEVICE_CHANNEL_CAPACITY);
        let agent = Self {
            device: Mutex::new(Some(rx)),
        };
        (agent, DeviceHandle { tx })
    }
}

#[async_trait]
impl Agent for EmbeddedAgent {
    async fn run(
        &self,
        shutdown: CancellationToken,
        config: AgentConfig,
        observer: &mut dyn PeerEventObserver,
    ) -> Result<(), AgentError> {
        validate_endpoints(&config)?;

        let mut lease = DeviceLease::take(&self.device).ok_or(AgentError::AlreadyRunning)?;
        let Some(device) = lease.device.as_mut() else {
            return Err(AgentError::AlreadyRunning);
        };

        let mode = TransportMode::for_config(&config);
        info!(%mode, pairs = config.predefined_pairs.len(), "link agent started");
        if config.join_token().is_none() {
            warn!("no join token configured, enrollment is unauthenticated");
        }

        let mut peers = PeerTable::new();
        peers.reserve(&config.predefined_pairs);

        let result = event_loop(&shutdown, device, &mut peers, observer).await;

        info!(peers = peers.len(), "link agent stopped");
        result
    }
}

/// The device receiver, out of the agent for one run.
///
/// Dropping the lease hands the receiver back, also when the run future is
/// dropped before it completes, so the agent can be started again.
struct DeviceLease<'a> {
    slot: &'a Mutex<Option<mpsc::Receiver<DeviceEvent>>>,
    device: Option<mpsc::Receiver<DeviceEvent>>,
}

impl<'a> DeviceLease<'a> {
    fn take(slot: &'a Mutex<Option<mpsc::Receiver<DeviceEvent>>>) -> Option<Self> {
        let device = slot.lock().take()?;
        Some(Self {
            slot,
            device: Some(device),
        })
    }
}

impl Drop for DeviceLease<'_> {
    fn drop(&mut self) {
        if let Some(device) = self.device.take() {
            *self.slot.lock() = Some(device);
        }
    }
}

async fn event_loop(
    shutdown: &CancellationToken,
    device: &mut mpsc::Receiver<DeviceEvent>,
    peers: &mut PeerTable,
    observer: &mut dyn PeerEventObserver,
) -> Result<(), AgentError> {
    let mut device_open = true;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => return Ok(()),

            event = device.recv(), if device_open => {
                let transition = match event {
                    Some(DeviceEvent::PeerUp { key, address }) => peers.peer_up(key, address),
                    Some(DeviceEvent::PeerDown { key }) => peers.peer_down(key),
                    Some(DeviceEvent::Failed(reason)) => return Err(AgentError::Device(reason)),
                    None => {
                        debug!("tunnel device detached, waiting for shutdown");
                        device_open = false;
                        None
                    }
                };

                if let Some(event) = transition {
                    observer.observe(&event);
                }
            }
        }
    }
}

/// Check that every configured endpoint looks like `host:port`.
pub fn validate_endpoints(config: &AgentConfig) -> Result<(), AgentError> {
    for (name, value) in config.endpoints() {
        let valid = value
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());

        if !valid {
            return Err(AgentError::InvalidEndpoint {
                name,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
