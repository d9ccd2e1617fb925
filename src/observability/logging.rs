//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format when configured, pretty format otherwise
//! - `RUST_LOG` overrides the configured level
//! - Written to stderr so the console output on stdout stays clean

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the filter: `RUST_LOG` if set, else the configured level for this crate.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("wallet_console={}", config.log_level.to_ascii_lowercase()).into()
    })
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
