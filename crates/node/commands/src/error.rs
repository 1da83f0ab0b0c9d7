//! Error kinds reported by dispatch.

/// How an error is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The invocation was malformed. The matched command's usage follows the
    /// message.
    Usage,
    /// The command ran and failed. Only the message is printed.
    Operational,
    /// The command tree itself is broken.
    Fatal,
}

/// Errors raised while building the command tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command {name:?} is already registered under {parent:?}")]
    DuplicateCommand { parent: String, name: String },
    #[error("global flag {0:?} is already registered")]
    DuplicateFlag(String),
    #[error("parent command {0:?} does not exist")]
    UnknownParent(String),
    #[error("command {0:?} has a handler and cannot take subcommands")]
    LeafParent(String),
    #[error("command {0:?} has neither subcommands nor a handler")]
    MissingHandler(String),
    #[error("cannot register {0:?}: the command tree is sealed")]
    Sealed(String),
}

/// Error returned by a command invocation.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Malformed invocation: bad flag, wrong argument count, unknown command.
    #[error("{0}")]
    Usage(String),
    /// The handler ran and failed.
    #[error("{0:#}")]
    Runtime(eyre::Report),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CommandError {
    /// A usage error raised by a handler after parsing succeeded.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage(_) => ErrorKind::Usage,
            Self::Runtime(_) => ErrorKind::Operational,
            Self::Registry(_) => ErrorKind::Fatal,
        }
    }

    /// Whether the command's usage text should follow the message.
    pub fn shows_usage(&self) -> bool {
        self.kind() == ErrorKind::Usage
    }
}

impl From<eyre::Report> for CommandError {
    fn from(report: eyre::Report) -> Self {
        Self::Runtime(report)
    }
}

impl From<clap::Error> for CommandError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.to_string();
        let first = rendered.lines().next().unwrap_or_default();
        let message = first.strip_prefix("error: ").unwrap_or(first);
        Self::Usage(message.trim().to_string())
    }
}
