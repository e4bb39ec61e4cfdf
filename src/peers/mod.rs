//! Peer tables derived from a configuration tree.
//!
//! # Data Flow
//! ```text
//! ConfigTree root
//!     → clients.rs (client <host> { secret, shortname })
//!     → realms.rs  (realm <name> { authhost, accthost, secret, flags })
//!     → validation.rs (field length limits)
//!     → PeerTable handed to the consumer
//! ```
//!
//! # Design Decisions
//! - Builders only read the tree; they never keep references into it
//! - The first bad entry fails the whole table so a reload can be refused

pub mod clients;
pub mod realms;
pub mod types;
pub mod validation;

pub use clients::generate_clients;
pub use realms::generate_realms;
pub use types::{Client, PeerDefaults, PeerTable, Realm};

use crate::config::error::Result;
use crate::config::tree::ConfigTree;
use crate::net::resolve::Resolve;

impl PeerTable {
    /// Build clients and realms from the root section of `tree`.
    pub fn from_tree(tree: &ConfigTree, resolver: &dyn Resolve, defaults: &PeerDefaults) -> Result<Self> {
        let root = tree.root();
        let table = Self {
            clients: generate_clients(root, resolver)?,
            realms: generate_realms(root, resolver, defaults)?,
        };
        tracing::info!(
            clients = table.clients.len(),
            realms = table.realms.len(),
            "Peer table built"
        );
        Ok(table)
    }
}
