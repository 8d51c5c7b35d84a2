//! Tracing initialization for the Ark MCP server.
//!
//! Logs always go to stderr: with the stdio transport, stdout carries the
//! MCP JSON-RPC stream and any stray line on it breaks the client.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls the log level and filtering. Examples:
//!   - `RUST_LOG=debug` - Enable debug logging for all modules
//!   - `RUST_LOG=ark_mcp_image=debug` - Enable debug for the image crate only
//!   - `RUST_LOG=warn,ark_mcp_common=debug` - Warn by default, debug for common

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

const DEFAULT_LEVEL: &str = "info";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
}

/// Install the global subscriber: `RUST_LOG` filtering (default `info`) and a
/// plain-text layer on stderr.
///
/// # Panics
///
/// Panics if a global subscriber is already set.
///
/// # Example
///
/// ```no_run
/// use ark_mcp_common::tracing::init_tracing;
///
/// init_tracing();
/// tracing::info!("Server starting");
/// ```
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_LEVEL))
        .with(stderr_layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_layer_composes_with_filter() {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("warn,ark_mcp_image=debug"))
            .with(stderr_layer());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("routed to stderr");
        });
    }

    #[test]
    fn test_default_level_enables_info() {
        let subscriber = tracing_subscriber::registry().with(EnvFilter::new(DEFAULT_LEVEL));
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(tracing::Level::INFO));
            assert!(!tracing::enabled!(tracing::Level::DEBUG));
        });
    }
}
