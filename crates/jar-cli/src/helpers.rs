//! Shared helper functions used across CLI subcommands.

use tracing_subscriber::EnvFilter;

/// Default filter for interactive use, quiet enough not to interleave with
/// the conversation.
pub const QUIET_LEVEL: &str = "warn";

/// Default filter with `--verbose`.
pub const VERBOSE_LEVEL: &str = "info";

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

/// Render a list of examples for display, quoting each one.
pub fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
