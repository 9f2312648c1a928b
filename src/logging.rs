//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive; wins over config.
pub const ENV_LOG: &str = "BUGTRACKER_LOG";

/// Pick the filter directive: `BUGTRACKER_LOG`, else `info` when verbose,
/// else the configured level.
pub fn filter_directive(env_value: Option<String>, verbose: bool, configured: &str) -> String {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(directive) => directive,
        None if verbose => "info".to_string(),
        None => configured.to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// view output. Calling this twice is harmless.
pub fn init(verbose: bool, level: &str, json: bool) {
    let directive = filter_directive(std::env::var(ENV_LOG).ok(), verbose, level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
