//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber once
//! - Pick the filter from the environment or the command line
//!
//! # Design Decisions
//! - Uses the tracing crate for structured events
//! - Falls back to `radconf=info` when nothing else is given

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "radconf=info";

/// Filter used when `RUST_LOG` is unset: `level` scoped to this crate, or the default.
pub fn default_filter(level: Option<&str>) -> String {
    match level {
        Some(level) if !level.is_empty() => format!("radconf={}", level),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
