//! Default locations for nodectl files.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Returns the default project directories for nodectl.
pub fn default_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "nodectl", "nodectl")
}

/// Returns the default client configuration file path.
pub fn default_config_file() -> Option<PathBuf> {
    default_project_dirs().map(|dirs| dirs.config_dir().join(crate::config::CONFIG_FILENAME))
}
