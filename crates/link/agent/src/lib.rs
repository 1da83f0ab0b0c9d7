//! Embedded overlay link agent.
//!
//! This crate owns the lifecycle side of the agent:
//! - [`AgentConfig`] - configuration snapshot for one run
//! - [`PeerEvent`] - peer transitions reported by the agent
//! - [`PeerEventObserver`] - callback interface for those transitions
//! - [`Agent`] / [`EmbeddedAgent`] - the agent interface and the in-process agent
//! - [`launch`] - runs an agent under a cancellation token
//!
//! The tunnel itself (key exchange, handshakes, routing) lives behind the
//! [`DeviceHandle`] that feeds the embedded agent.

pub mod agent;
pub mod config;
pub mod error;
pub mod event;
pub mod launch;
pub mod observer;
pub mod peers;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use agent::{Agent, DeviceEvent, DeviceHandle, EmbeddedAgent, TransportMode};
pub use config::{AgentConfig, PairParseError, PredefinedPair};
pub use error::AgentError;
pub use event::{KeyParseError, PeerAdded, PeerEvent, PeerKey};
pub use launch::launch;
pub use observer::{LoggingObserver, PeerEventObserver};
pub use peers::PeerTable;
