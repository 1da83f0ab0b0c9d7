//! Agent error types.

/// Failure of the embedded agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid {name} endpoint {value:?}: expected host:port")]
    InvalidEndpoint { name: &'static str, value: String },
    #[error("tunnel device failed: {0}")]
    Device(String),
    #[error("agent is already running")]
    AlreadyRunning,
}
