//! Logging initialization.
//!
//! Structured logging via the `tracing` ecosystem. Logs go to stderr so
//! stdout stays clean for command output; `RUST_LOG` overrides the
//! configured level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with settings from the config file, with CLI flag
/// overrides applied on top.
pub fn init_from_config(config: &toonify_core::Config, verbose: bool, json_logs: bool) {
    let level = if verbose {
        "debug"
    } else {
        match config.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => config.logging.level.as_str(),
            _ => "info",
        }
    };
    let json = json_logs || config.logging.format == "json";

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
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
