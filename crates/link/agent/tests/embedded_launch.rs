//! Launching the embedded agent end to end through its device handle.

use std::time::Duration;

use nodectl_link::{
    AgentConfig, EmbeddedAgent, PeerAdded, PeerEventObserver, PeerKey, launch,
};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Seen {
    added: Vec<PeerAdded>,
    removed: Vec<PeerKey>,
}

impl PeerEventObserver for Seen {
    fn handle_peer_added(&mut self, event: &PeerAdded) {
        self.added.push(*event);
    }

    fn handle_peer_removed(&mut self, key: &PeerKey) {
        self.removed.push(*key);
    }
}

fn config() -> AgentConfig {
    AgentConfig {
        api_endpoint: "127.0.0.1:4000".into(),
        join_token: "token".into(),
        wireguard_endpoint: "10.5.0.1:51821".into(),
        predefined_pairs: vec![
            "a1b2c3d4-0000-4000-8000-000000000001=fd00::10"
                .parse()
                .unwrap(),
        ],
        force_userspace: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn embedded_agent_runs_until_cancelled() {
    let (agent, device) = EmbeddedAgent::new();
    let shutdown = CancellationToken::new();
    let mut seen = Seen::default();

    let key = PeerKey::new([4u8; 32]);
    let feeder = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            device.peer_up(key, "fd00::1".parse().unwrap()).await.unwrap();
            device.peer_down(key).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown.cancel();
        })
    };

    launch(&agent, shutdown, config(), &mut seen).await.unwrap();
    feeder.await.unwrap();

    assert_eq!(seen.added.len(), 1);
    assert_eq!(seen.added[0].address.to_string(), "fd00::1");
    assert_eq!(seen.removed, vec![key]);
}

#[tokio::test]
async fn embedded_agent_startup_failure_is_wrapped() {
    let (agent, _device) = EmbeddedAgent::new();
    let config = AgentConfig {
        log_endpoint: "logs.local".into(),
        ..config()
    };

    let err = launch(&agent, CancellationToken::new(), config, &mut Seen::default())
        .await
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.starts_with("failed to run siderolink agent: "), "{message}");
    assert!(message.contains("invalid log endpoint"), "{message}");
}
