//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable through `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` always wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(log_level: &str) -> String {
    let level = log_level.to_ascii_lowercase();
    format!("driver_care={level},tower_http={level}")
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber was already installed (e.g. by a previous call).
pub fn init_logging(log_level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
