//! Logging initialization for the git-promote binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for a `-v` count. Zero keeps git-promote silent so the
/// only output is git's own.
pub fn filter_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "git_promote=off",
        1 => "git_promote=info",
        2 => "git_promote=debug",
        _ => "git_promote=trace",
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over `-v`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .try_init();
}
