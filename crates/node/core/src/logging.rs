//! Logging setup.

use crate::args::LogArgs;
use tracing_subscriber::EnvFilter;

/// Build the filter for the given arguments.
///
/// Precedence:
/// 1. If `--quiet` is set, only errors are shown
/// 2. Otherwise, start with `RUST_LOG` env var if set, or the level implied by `-v`
/// 3. Apply any custom directives from `--log.filter`
pub fn build_filter(args: &LogArgs) -> EnvFilter {
    if args.quiet {
        return EnvFilter::new("error");
    }

    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.base_level()));

    if let Some(custom_filter) = &args.filter {
        for directive in custom_filter.split(',') {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }
    }

    filter
}

/// Install the global subscriber. Logs go to stderr so they never mix with
/// command output.
///
/// Returns `false` if a subscriber was already installed (embedding, tests),
/// in which case the existing one is kept.
pub fn init_logging(args: &LogArgs) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(args))
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if args.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.is_ok()
}
