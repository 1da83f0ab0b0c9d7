//! Version information for nodectl.

/// The version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The git commit SHA (set by build.rs if available).
pub const GIT_SHA: &str = {
    match option_env!("VERGEN_GIT_SHA") {
        Some(sha) => sha,
        None => "unknown",
    }
};

/// Whether the tree had uncommitted changes at build time.
pub const GIT_DIRTY: &str = {
    match option_env!("VERGEN_GIT_DIRTY") {
        Some(dirty) => dirty,
        None => "false",
    }
};

/// The build timestamp (set by build.rs if available).
pub const BUILD_TIMESTAMP: &str = {
    match option_env!("VERGEN_BUILD_TIMESTAMP") {
        Some(ts) => ts,
        None => "unknown",
    }
};

/// The long version information (lazy static for runtime access).
pub static LONG_VERSION: once_cell::sync::Lazy<String> = once_cell::sync::Lazy::new(|| {
    let dirty = if GIT_DIRTY == "true" { "-dirty" } else { "" };
    format!(
        "Tag:         v{VERSION}\nSHA:         {GIT_SHA}{dirty}\nBuilt:       {BUILD_TIMESTAMP}"
    )
});
