//! Hierarchical configuration files for a RADIUS-style server.
//!
//! # Architecture Overview
//!
//! ```text
//!     config file ──▶ config::loader ──▶ config::reader ──▶ ConfigTree
//!                          │                                    │
//!                          ▼                                    ▼
//!                     $INCLUDE files               config::access / extract
//!                                                               │
//!                                                               ▼
//!                                               peers (clients, realms)
//!                                                               │
//!     SIGHUP / file change ──▶ lifecycle::reload ──▶ config::store (arc-swap)
//! ```

// Core subsystems
pub mod config;
pub mod net;
pub mod peers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::{ConfigError, ConfigStore, ConfigTree, Loader, LoaderOptions};
pub use lifecycle::{Reloader, Shutdown};
pub use peers::PeerTable;
