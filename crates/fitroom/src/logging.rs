//! Tracing setup for the CLI.
//!
//! Everything goes to stderr so stdout stays clean for tag/recommend
//! JSON output that callers may want to pipe.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `verbose` lowers the default level from INFO to DEBUG; an explicit
/// `RUST_LOG` wins over both. `json_format` switches the fmt layer from
/// human-readable to JSON lines, for when the CLI runs under a log
/// collector.
pub fn init(verbose: bool, json_format: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}
