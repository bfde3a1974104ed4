//! Diagnostic logging setup
//!
//! Diagnostics go to stderr through `tracing`; operator-facing progress and
//! summaries are printed to stdout by the command modules.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "TASKCHECK_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Pick the filter directive: `debug` when verbose, otherwise `TASKCHECK_LOG`,
/// then `RUST_LOG`, then `warn`.
pub fn filter_directive(verbose: bool) -> String {
    if verbose {
        return "debug".to_string();
    }
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let directive = filter_directive(verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_precedence() {
        std::env::remove_var(LOG_ENV);
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter_directive(false), "warn");

        std::env::set_var("RUST_LOG", "info");
        assert_eq!(filter_directive(false), "info");

        std::env::set_var(LOG_ENV, "taskcheck=trace");
        assert_eq!(filter_directive(false), "taskcheck=trace");
        assert_eq!(filter_directive(true), "debug");

        std::env::remove_var(LOG_ENV);
        std::env::remove_var("RUST_LOG");
    }
}
