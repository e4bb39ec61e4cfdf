//! Lifecycle of the `watch` command.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGHUP → ChangeEvent on the reload channel
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Reload (reload.rs):
//!     ChangeEvent → spawn_blocking(load + build peers) → install or keep previous
//!
//! Shutdown (shutdown.rs):
//!     trigger → reload loop returns → runtime drops the watcher
//! ```
//!
//! # Design Decisions
//! - The reload loop is the only writer of the store
//! - Reloads run on the blocking pool because loading does file and DNS I/O
//! - A failed reload is logged and the previous configuration stays in place

pub mod reload;
pub mod shutdown;
pub mod signals;

pub use reload::Reloader;
pub use shutdown::Shutdown;
pub use signals::SignalEvent;
