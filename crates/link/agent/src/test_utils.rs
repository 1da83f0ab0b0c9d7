//! Test helpers: a scripted agent, a recording observer and log capture.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{Level, subscriber::DefaultGuard};
use tracing_subscriber::fmt::MakeWriter;

use crate::{
    agent::Agent,
    config::AgentConfig,
    error::AgentError,
    event::{PeerAdded, PeerEvent, PeerKey},
    observer::PeerEventObserver,
};

/// How a [`ScriptedAgent`] ends its run after replaying its events.
#[derive(Debug, Clone)]
pub enum ScriptOutcome {
    /// Return success immediately.
    Succeed,
    /// Fail immediately with a device error.
    Fail(String),
    /// Block until shutdown, then succeed.
    WaitForShutdown,
    /// Block until shutdown, then fail.
    FailOnShutdown(String),
}

/// Agent replaying a fixed list of peer events.
#[derive(Debug)]
pub struct ScriptedAgent {
    events: Vec<PeerEvent>,
    outcome: ScriptOutcome,
    runs: AtomicUsize,
    last_config: Mutex<Option<AgentConfig>>,
}

impl ScriptedAgent {
    pub fn new(events: Vec<PeerEvent>, outcome: ScriptOutcome) -> Self {
        Self {
            events,
            outcome,
            runs: AtomicUsize::new(0),
            last_config: Mutex::new(None),
        }
    }

    /// Number of times `run` was called.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Configuration passed to the most recent run.
    pub fn last_config(&self) -> Option<AgentConfig> {
        self.last_config.lock().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn run(
        &self,
        shutdown: CancellationToken,
        config: AgentConfig,
        observer: &mut dyn PeerEventObserver,
    ) -> Result<(), AgentError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        *self.last_config.lock() = Some(config);

        for event in &self.events {
            observer.observe(event);
        }

        match &self.outcome {
            ScriptOutcome::Succeed => Ok(()),
            ScriptOutcome::Fail(reason) => Err(AgentError::Device(reason.clone())),
            ScriptOutcome::WaitForShutdown => {
                shutdown.cancelled().await;
                Ok(())
            }
            ScriptOutcome::FailOnShutdown(reason) => {
                shutdown.cancelled().await;
                Err(AgentError::Device(reason.clone()))
            }
        }
    }
}

/// Observer keeping every event it sees, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<PeerEvent>,
}

impl RecordingObserver {
    pub fn removed(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PeerEvent::Removed(_)))
            .count()
    }
}

impl PeerEventObserver for RecordingObserver {
    fn handle_peer_added(&mut self, event: &PeerAdded) {
        self.events.push(PeerEvent::Added(*event));
    }

    fn handle_peer_removed(&mut self, key: &PeerKey) {
        self.events.push(PeerEvent::Removed(*key));
    }
}

/// Shared buffer collecting formatted log lines.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

#[derive(Debug)]
pub struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(self.0.clone())
    }
}

/// Install an info-level capturing subscriber for the current thread.
///
/// Use with a current-thread runtime so spawned tasks log into the same
/// buffer.
pub fn log_capture() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

/// Run `f` with a capturing subscriber and return what it logged.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let (buffer, guard) = log_capture();
    f();
    drop(guard);
    buffer.contents()
}
