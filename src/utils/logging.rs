//! Tracing setup for the command-line front end.

use tracing_subscriber::EnvFilter;

const CRATE_TARGET: &str = "expense_outbox";

/// Filter directive for `log.level`, scoped to this crate so that reqwest,
/// hyper and sled stay at their default (off) level.
///
/// Unknown levels fall back to `info`.
pub fn directive(level: &str) -> String {
    let level = match level.trim().to_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        "off" => "off",
        _ => "info",
    };
    format!("{CRATE_TARGET}={level}")
}

/// `RUST_LOG` wins over the configured level when it is set and parses.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)))
}

/// Install the global fmt subscriber. Later calls are ignored.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .try_init();
}
