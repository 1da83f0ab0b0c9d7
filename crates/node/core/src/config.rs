//! Client configuration file.
//!
//! Configuration priority (highest wins):
//! 1. Global CLI flags (`--context`, `--nodes`, ...), applied by callers
//! 2. Config file (TOML)
//! 3. Environment variables (`NODECTL_` prefix)
//! 4. Defaults
//!
//! The file location is resolved from `--nodeconfig`, then the
//! `NODECONFIG` environment variable, then the per-user config directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "NODECONFIG";

/// File name inside the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Errors from loading or querying the client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },
    #[error("no context is selected")]
    NoContext,
    #[error("context {0:?} is not defined")]
    UnknownContext(String),
}

/// A named target: how to reach a cluster and which nodes to talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub endpoints: Vec<String>,
    pub nodes: Vec<String>,
    pub cluster: Option<String>,
}

/// Contents of the client configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Name of the current context.
    pub context: Option<String>,
    /// All known contexts by name.
    pub contexts: BTreeMap<String, Context>,
}

impl ClientConfig {
    /// Resolve the configuration file path.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => crate::dirs::default_config_file(),
        }
    }

    /// Load the configuration. A missing file yields an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(ClientConfig::default()))
            .merge(Env::prefixed("NODECTL_").only(&["context"]));

        if let Some(path) = path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.extract().map_err(|e| ConfigError::Load {
            path: path.map(Path::to_path_buf).unwrap_or_default(),
            source: Box::new(e),
        })
    }

    /// Load from the location [`resolve_path`](Self::resolve_path) picks.
    pub fn load_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load(Self::resolve_path(explicit).as_deref())
    }

    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    /// The selected context, with `name` taking precedence over the file's
    /// current context.
    pub fn current_context<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Context), ConfigError> {
        let name = name
            .or(self.context.as_deref())
            .ok_or(ConfigError::NoContext)?;
        let context = self
            .contexts
            .get(name)
            .ok_or_else(|| ConfigError::UnknownContext(name.to_string()))?;
        Ok((name, context))
    }
}
