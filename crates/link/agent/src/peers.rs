//! Peer bookkeeping for the embedded agent.
//!
//! The tunnel device may report the same state more than once (re-handshakes,
//! reconnects). [`PeerTable`] turns raw device reports into transitions so
//! observers see each join or leave exactly once.
//!
//! Addresses of predefined pairs are pinned: the first peer to come up on a
//! reserved address owns it for the lifetime of the table, and any other
//! peer claiming it is ignored.

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv6Addr},
};

use tracing::{debug, warn};

use crate::{
    config::PredefinedPair,
    event::{PeerAdded, PeerEvent, PeerKey},
};

/// Known peers and reserved addresses.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: HashMap<PeerKey, IpAddr>,
    /// Reserved address to the peer that claimed it, once claimed.
    reserved: HashMap<Ipv6Addr, Option<PeerKey>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the addresses of predefined pairs.
    pub fn reserve<'a>(&mut self, pairs: impl IntoIterator<Item = &'a PredefinedPair>) {
        for pair in pairs {
            self.reserved.entry(pair.address).or_insert(None);
        }
    }

    pub fn is_reserved(&self, address: &Ipv6Addr) -> bool {
        self.reserved.contains_key(address)
    }

    /// Peer that claimed the reserved `address`, if any.
    pub fn owner_of(&self, address: &Ipv6Addr) -> Option<PeerKey> {
        self.reserved.get(address).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn address_of(&self, key: &PeerKey) -> Option<IpAddr> {
        self.peers.get(key).copied()
    }

    /// Record a peer as up. Returns the event to deliver, if this is a
    /// transition. A known peer that moved to a new address is reported
    /// again with the new address.
    ///
    /// A peer is ignored when another live peer holds `address`, or when
    /// `address` is reserved and owned by another peer.
    pub fn peer_up(&mut self, key: PeerKey, address: IpAddr) -> Option<PeerEvent> {
        if let Some((holder, _)) = self
            .peers
            .iter()
            .find(|(other, held)| **held == address && **other != key)
        {
            warn!(%key, %address, %holder, "address already in use, peer ignored");
            return None;
        }

        if let IpAddr::V6(v6) = address {
            if let Some(owner) = self.reserved.get_mut(&v6) {
                match *owner {
                    Some(pinned) if pinned != key => {
                        warn!(%key, %address, owner = %pinned, "predefined address belongs to another peer, peer ignored");
                        return None;
                    }
                    _ => *owner = Some(key),
                }
            }
        }

        match self.peers.insert(key, address) {
            Some(previous) if previous == address => {
                debug!(%key, %address, "duplicate peer up ignored");
                None
            }
            _ => Some(PeerEvent::Added(PeerAdded { address, key })),
        }
    }

    /// Record a peer as down. Returns the event to deliver, if the peer was
    /// known.
    pub fn peer_down(&mut self, key: PeerKey) -> Option<PeerEvent> {
        match self.peers.remove(&key) {
            Some(_) => Some(PeerEvent::Removed(key)),
            None => {
                debug!(%key, "peer down for unknown peer ignored");
                None
            }
        }
    }
}
