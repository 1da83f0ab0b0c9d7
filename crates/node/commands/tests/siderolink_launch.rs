//! `siderolink-launch` driven through the full command tree.

use std::{sync::Arc, time::Duration};

use nodectl_commands::{
    CommandRegistry, Dispatcher, ErrorKind, GlobalArgs, Outcome, commands::mgmt::siderolink,
    default_registry, root_command,
};
use nodectl_link::{
    LoggingObserver, PeerAdded, PeerEvent, PeerEventObserver, PeerKey,
    test_utils::{RecordingObserver, ScriptOutcome, ScriptedAgent, log_capture},
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

fn peer_added(address: &str) -> PeerEvent {
    PeerEvent::Added(PeerAdded {
        address: address.parse().unwrap(),
        key: PeerKey::new([9u8; 32]),
    })
}

fn dispatcher(agent: Arc<ScriptedAgent>, shutdown: CancellationToken) -> Dispatcher {
    let registry = default_registry(agent).unwrap();
    Dispatcher::new(registry, shutdown).without_logging()
}

fn reported(dispatcher: &Dispatcher, outcome: &Outcome) -> (String, String) {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    dispatcher.report(outcome, &mut out, &mut err).unwrap();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

/// Logs like the shipped command and records what it saw.
#[derive(Default)]
struct LogAndRecord {
    log: LoggingObserver,
    record: RecordingObserver,
}

impl PeerEventObserver for LogAndRecord {
    fn handle_peer_added(&mut self, event: &PeerAdded) {
        self.log.handle_peer_added(event);
        self.record.handle_peer_added(event);
    }

    fn handle_peer_removed(&mut self, key: &PeerKey) {
        self.log.handle_peer_removed(key);
        self.record.handle_peer_removed(key);
    }
}

#[tokio::test]
async fn peer_added_is_logged_and_exits_cleanly() {
    let agent = Arc::new(ScriptedAgent::new(vec![peer_added("fd00::1")], ScriptOutcome::Succeed));
    let observer = Arc::new(Mutex::new(LogAndRecord::default()));

    let mut registry = CommandRegistry::new(root_command());
    for flag in GlobalArgs::flags() {
        registry.register_global_flag(flag).unwrap();
    }
    registry
        .register(&[], siderolink::command_with_observer(agent.clone(), observer.clone()))
        .unwrap();
    let mut dispatcher = Dispatcher::new(registry, CancellationToken::new()).without_logging();
    let (logs, _guard) = log_capture();

    let outcome = dispatcher
        .execute([
            "nodectl",
            "siderolink-launch",
            "--sidero-link-join-token=secret",
            "--sidero-link-api-endpoint=10.5.0.1:4000",
            "--predefined-pair",
            "a1b2c3d4-0000-4000-8000-000000000001=fd00::10",
        ])
        .await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(outcome.path, vec!["siderolink-launch"]);
    let (out, err) = reported(&dispatcher, &outcome);
    assert!(out.is_empty());
    assert!(err.is_empty());

    let logs = logs.contents();
    assert!(logs.contains("agent sees peer added"), "{logs}");
    assert!(logs.contains("address=fd00::1"), "{logs}");
    assert!(!logs.contains("secret"), "{logs}");

    let observer = observer.lock().await;
    assert_eq!(observer.record.events, vec![peer_added("fd00::1")]);
    assert_eq!(observer.record.removed(), 0);

    assert_eq!(agent.runs(), 1);
    let config = agent.last_config().unwrap();
    assert_eq!(config.join_token, "secret");
    assert_eq!(config.api_endpoint, "10.5.0.1:4000");
    assert_eq!(config.predefined_pairs.len(), 1);
    assert!(config.force_userspace);
}

#[tokio::test]
async fn interrupt_before_dispatch_exits_cleanly() {
    let agent = Arc::new(ScriptedAgent::new(vec![], ScriptOutcome::WaitForShutdown));
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let mut dispatcher = dispatcher(agent.clone(), shutdown);

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.execute(["nodectl", "siderolink-launch"]),
    )
    .await
    .unwrap();

    assert!(outcome.is_success(), "{:?}", outcome.result);
    let (_, err) = reported(&dispatcher, &outcome);
    assert!(err.is_empty(), "{err}");
    assert_eq!(agent.runs(), 1);
}

#[tokio::test]
async fn interrupt_exits_cleanly() {
    let agent = Arc::new(ScriptedAgent::new(vec![], ScriptOutcome::WaitForShutdown));
    let shutdown = CancellationToken::new();
    let mut dispatcher = dispatcher(agent.clone(), shutdown.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.execute(["nodectl", "siderolink-launch"]),
    )
    .await
    .unwrap();

    assert!(outcome.is_success(), "{:?}", outcome.result);
    let (_, err) = reported(&dispatcher, &outcome);
    assert!(err.is_empty(), "{err}");
}

#[tokio::test]
async fn failure_during_interrupt_is_not_reported() {
    let agent = Arc::new(ScriptedAgent::new(
        vec![],
        ScriptOutcome::FailOnShutdown("device torn down".into()),
    ));
    let shutdown = CancellationToken::new();
    let mut dispatcher = dispatcher(agent, shutdown.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
    });

    let outcome = dispatcher.execute(["nodectl", "siderolink-launch"]).await;
    assert!(outcome.is_success(), "{:?}", outcome.result);
}

#[tokio::test]
async fn agent_failure_is_operational() {
    let agent = Arc::new(ScriptedAgent::new(vec![], ScriptOutcome::Fail("no tun device".into())));
    let mut dispatcher = dispatcher(agent, CancellationToken::new());

    let outcome = dispatcher.execute(["nodectl", "siderolink-launch"]).await;

    assert_eq!(outcome.result.as_ref().unwrap_err().kind(), ErrorKind::Operational);
    let (_, err) = reported(&dispatcher, &outcome);
    assert_eq!(
        err,
        "error: failed to run siderolink agent: tunnel device failed: no tun device\n"
    );
}

#[tokio::test]
async fn positional_argument_is_a_usage_error() {
    let agent = Arc::new(ScriptedAgent::new(vec![], ScriptOutcome::Succeed));
    let mut dispatcher = dispatcher(agent.clone(), CancellationToken::new());

    let outcome = dispatcher.execute(["nodectl", "siderolink-launch", "extra"]).await;

    assert_eq!(outcome.result.as_ref().unwrap_err().kind(), ErrorKind::Usage);
    let (_, err) = reported(&dispatcher, &outcome);
    assert!(err.starts_with("error: unexpected argument 'extra' found\n\n"), "{err}");
    assert!(err.contains("Usage: nodectl siderolink-launch"), "{err}");
    assert_eq!(agent.runs(), 0);
}

#[tokio::test]
async fn malformed_predefined_pair_is_a_usage_error() {
    let agent = Arc::new(ScriptedAgent::new(vec![], ScriptOutcome::Succeed));
    let mut dispatcher = dispatcher(agent.clone(), CancellationToken::new());

    let outcome = dispatcher
        .execute(["nodectl", "siderolink-launch", "--predefined-pair", "fd00::1"])
        .await;

    assert_eq!(outcome.result.as_ref().unwrap_err().kind(), ErrorKind::Usage);
    let (_, err) = reported(&dispatcher, &outcome);
    assert!(err.contains("--predefined-pair"), "{err}");
    assert_eq!(agent.runs(), 0);
}

#[tokio::test]
async fn global_flags_are_accepted_alongside() {
    let agent = Arc::new(ScriptedAgent::new(vec![], ScriptOutcome::Succeed));
    let mut dispatcher = dispatcher(agent.clone(), CancellationToken::new());

    let outcome = dispatcher
        .execute(["nodectl", "-n", "10.5.0.2", "siderolink-launch", "--context", "lab"])
        .await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(agent.runs(), 1);
}
