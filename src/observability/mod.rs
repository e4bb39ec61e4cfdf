//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! loader, store, peers, watch loop
//!     → tracing events (file, line, counts as fields)
//!     → logging.rs subscriber (EnvFilter + fmt layer)
//!     → stderr
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the command-line level
//! - Log lines go to stderr so `dump` and `peers` output stays clean

pub mod logging;

pub use logging::init;
