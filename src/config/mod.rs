//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (sections, pairs, $INCLUDE, ${var})
//!     → loader.rs (open file, include stack, limits)
//!     → reader.rs (recursive descent over token.rs output)
//!     → substitute.rs (expand ${name} against earlier pairs)
//!     → ConfigTree (immutable arena, tree.rs + access.rs)
//!     → store.rs (atomic swap of Arc<ConfigTree>)
//!     → consumers read via access.rs and extract.rs
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → store.rs loads new tree in isolation
//!     → consumers rebuild from it
//!     → new tree installed only if everything succeeded
//! ```
//!
//! # Design Decisions
//! - A tree is immutable once loaded; changes require a full reload
//! - Any error aborts the whole load; there is no partial recovery
//! - `$INCLUDE` places the included file's root section at the point of
//!   inclusion rather than merging its contents into the current section

mod access;
pub mod dump;
pub mod error;
pub mod extract;
pub mod loader;
mod reader;
pub mod store;
mod substitute;
pub mod token;
pub mod tree;
pub mod watcher;

pub use dump::dump;
pub use error::{ConfigError, ErrorKind, Location, Result};
pub use extract::{parse_section, FieldSpec, Target};
pub use loader::{Loader, LoaderOptions};
pub use store::ConfigStore;
pub use token::Operator;
pub use tree::{ConfigTree, Item, PairRef, SectionRef};
