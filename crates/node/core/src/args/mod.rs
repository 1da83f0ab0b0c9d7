//! CLI argument structs for shared infrastructure configuration.

mod log;

pub use log::LogArgs;
