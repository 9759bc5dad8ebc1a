use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Human-readable logs for local runs.
/// `RUST_LOG` wins when set; otherwise request traces from `tower_http` and the
/// service's own events are shown at info.
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,axum=info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// One JSON object per line, for deployments that ship logs to a collector.
/// Storage events (Redis fallback, dropped writes) are emitted at debug as well.
pub fn init_logging_json() {
    // 可通过 RUST_LOG 覆盖，例如 RUST_LOG=info,service::storage=trace
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,service::storage=debug"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// `server.log_format`: `json` selects structured output, anything else the compact one.
pub fn init_logging_with_format(format: &str) {
    if format.eq_ignore_ascii_case("json") {
        init_logging_json();
    } else {
        init_logging_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging_with_format("json");
        init_logging_with_format("compact");
        tracing::info!(event = "logger_test", "still logging after second init");
    }
}
