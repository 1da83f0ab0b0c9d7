//! Peer lifecycle events emitted by the agent.

use std::{fmt, net::IpAddr, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};

/// Length of a Curve25519 public key.
pub const KEY_LEN: usize = 32;

/// Public key identifying an overlay peer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerKey([u8; KEY_LEN]);

impl PeerKey {
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(self.0))
    }
}

impl fmt::Debug for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerKey({self})")
    }
}

/// Error parsing a base64 peer key.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("invalid base64 key: {0}")]
    Encoding(String),
    #[error("key must be {KEY_LEN} bytes, got {0}")]
    Length(usize),
}

impl FromStr for PeerKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| KeyParseError::Encoding(e.to_string()))?;
        let bytes: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| KeyParseError::Length(b.len()))?;
        Ok(Self(bytes))
    }
}

/// A peer joined the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAdded {
    /// Overlay address assigned to the peer.
    pub address: IpAddr,
    /// Peer public key.
    pub key: PeerKey,
}

/// Peer state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerEvent {
    Added(PeerAdded),
    Removed(PeerKey),
}

impl PeerEvent {
    pub fn key(&self) -> &PeerKey {
        match self {
            Self::Added(added) => &added.key,
            Self::Removed(key) => key,
        }
    }
}
