//! Agent configuration snapshot.

use std::{fmt, net::Ipv6Addr, str::FromStr};

use uuid::Uuid;

/// Configuration handed to the agent for a single run.
///
/// Empty strings mean "unset": the agent falls back to defaults or disables
/// the feature behind the endpoint. Nothing here is validated on
/// construction.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    /// Advertised WireGuard endpoint (`host:port`).
    pub wireguard_endpoint: String,
    /// SideroLink gRPC API endpoint.
    pub api_endpoint: String,
    /// Join token presented by enrolling nodes.
    pub join_token: String,
    /// Event sink gRPC endpoint.
    pub sink_endpoint: String,
    /// TCP log receiver endpoint.
    pub log_endpoint: String,
    /// Static node identifier to overlay address assignments.
    pub predefined_pairs: Vec<PredefinedPair>,
    /// Run the tunnel in userspace instead of the kernel module.
    pub force_userspace: bool,
}

impl AgentConfig {
    pub fn wireguard_endpoint(&self) -> Option<&str> {
        non_empty(&self.wireguard_endpoint)
    }

    pub fn api_endpoint(&self) -> Option<&str> {
        non_empty(&self.api_endpoint)
    }

    pub fn join_token(&self) -> Option<&str> {
        non_empty(&self.join_token)
    }

    pub fn sink_endpoint(&self) -> Option<&str> {
        non_empty(&self.sink_endpoint)
    }

    pub fn log_endpoint(&self) -> Option<&str> {
        non_empty(&self.log_endpoint)
    }

    /// All set endpoints, labelled by the flag that configures them.
    pub fn endpoints(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("wireguard", self.wireguard_endpoint()),
            ("api", self.api_endpoint()),
            ("sink", self.sink_endpoint()),
            ("log", self.log_endpoint()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

// The join token is a credential and must not end up in logs.
impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("wireguard_endpoint", &self.wireguard_endpoint)
            .field("api_endpoint", &self.api_endpoint)
            .field("join_token", &self.join_token().map(|_| "<redacted>"))
            .field("sink_endpoint", &self.sink_endpoint)
            .field("log_endpoint", &self.log_endpoint)
            .field("predefined_pairs", &self.predefined_pairs)
            .field("force_userspace", &self.force_userspace)
            .finish()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// A node identifier pinned to a fixed overlay address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredefinedPair {
    pub id: Uuid,
    pub address: Ipv6Addr,
}

/// Error parsing a `UUID=IPv6` pair.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PairParseError {
    #[error("expected UUID=IPv6, got {0:?}")]
    Format(String),
    #[error("invalid node identifier {0:?}")]
    Id(String),
    #[error("invalid IPv6 address {0:?}")]
    Address(String),
}

impl FromStr for PredefinedPair {
    type Err = PairParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, address) = s
            .split_once('=')
            .ok_or_else(|| PairParseError::Format(s.to_string()))?;

        let id = Uuid::parse_str(id.trim()).map_err(|_| PairParseError::Id(id.to_string()))?;
        let address = address
            .trim()
            .parse()
            .map_err(|_| PairParseError::Address(address.to_string()))?;

        Ok(Self { id, address })
    }
}

impl fmt::Display for PredefinedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_fields_are_unset() {
        let config = AgentConfig {
            api_endpoint: "127.0.0.1:4000".into(),
            ..Default::default()
        };

        assert_eq!(config.api_endpoint(), Some("127.0.0.1:4000"));
        assert_eq!(config.join_token(), None);
        assert_eq!(config.wireguard_endpoint(), None);
        assert_eq!(config.endpoints().collect::<Vec<_>>(), vec![("api", "127.0.0.1:4000")]);
    }

    #[test]
    fn test_debug_redacts_join_token() {
        let config = AgentConfig {
            join_token: "s3cr3t".into(),
            ..Default::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_parse_pair() {
        let pair: PredefinedPair = "a1b2c3d4-0000-4000-8000-000000000001=fd00::1".parse().unwrap();
        assert_eq!(pair.address, "fd00::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(pair.to_string(), "a1b2c3d4-0000-4000-8000-000000000001=fd00::1");
    }

    #[test]
    fn test_parse_pair_errors() {
        assert_matches!("fd00::1".parse::<PredefinedPair>(), Err(PairParseError::Format(_)));
        assert_matches!("node-1=fd00::1".parse::<PredefinedPair>(), Err(PairParseError::Id(_)));
        assert_matches!(
            "a1b2c3d4-0000-4000-8000-000000000001=10.0.0.1".parse::<PredefinedPair>(),
            Err(PairParseError::Address(_))
        );
    }
}
