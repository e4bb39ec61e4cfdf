//! Peer and realm definitions built from the configuration tree.
//!
//! All types derive Serialize so the CLI can print them. Shared secrets are
//! never serialized.

use std::net::IpAddr;
use serde::Serialize;

/// A network peer allowed to send requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    /// Host label from `client <host> { ... }`.
    pub hostname: String,

    /// Resolved address of `hostname`.
    pub ipaddr: IpAddr,

    /// Shared secret.
    #[serde(skip_serializing)]
    pub secret: String,

    /// Short name used in logs (may be empty).
    pub shortname: String,

    /// Reverse-resolved name, or the textual address when none exists.
    pub longname: String,

    /// Line of the `client` header, for diagnostics.
    pub line: usize,
}

/// A routing realm forwarded to a remote server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Realm {
    /// Realm name from `realm <name> { ... }`.
    pub realm: String,

    /// Authentication host name, or `LOCAL`.
    pub server: String,

    /// Address of `server`; `None` for `LOCAL` realms.
    pub ipaddr: Option<IpAddr>,

    pub auth_port: u16,

    /// Accounting port; 0 when `noacct` is set.
    pub acct_port: u16,

    #[serde(skip_serializing)]
    pub secret: String,

    /// Strip the realm from the user name before forwarding.
    pub strip_realm: bool,

    pub trusted: bool,

    pub line: usize,
}

/// Defaults applied while building realms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDefaults {
    /// Used when `authhost` has no `:port`.
    pub auth_port: u16,

    /// Used when `accthost` is absent or has no `:port`.
    pub acct_port: u16,
}

impl Default for PeerDefaults {
    fn default() -> Self {
        Self {
            auth_port: 1812,
            acct_port: 1813,
        }
    }
}

/// Everything consumers derive from one configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeerTable {
    pub clients: Vec<Client>,
    pub realms: Vec<Realm>,
}
