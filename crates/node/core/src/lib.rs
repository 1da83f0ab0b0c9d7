//! Shared infrastructure for the nodectl command line.
//!
//! - [`args`] - CLI argument structs shared by every command
//! - [`config`] - Client configuration file (contexts, endpoints, nodes)
//! - [`dirs`] - Default file locations
//! - [`logging`] - Logging initialization
//! - [`version`] - Version information

pub mod args;
pub mod config;
pub mod dirs;
pub mod logging;
pub mod version;
