//! Host name resolution.
//!
//! # Responsibilities
//! - Turn a host name or literal into an address
//! - Turn an address back into a host name for display
//!
//! # Design Decisions
//! - Literal addresses never touch DNS
//! - Blocking API: configuration loading is synchronous; do not call the
//!   system resolver from inside an async task
//! - A static table implementation serves tests and offline checks

use std::collections::HashMap;
use std::net::IpAddr;

use thiserror::Error;
use trust_dns_resolver::Resolver;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no address found for {0}")]
    NotFound(String),

    #[error("lookup of {host} failed: {reason}")]
    Lookup { host: String, reason: String },

    #[error("resolver unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
}

/// Name resolution used by the typed extractor and the peer builders.
pub trait Resolve: Send + Sync {
    /// Resolve `host` to one address.
    fn resolve_address(&self, host: &str) -> Result<IpAddr, ResolveError>;

    /// Textual form of an address.
    fn address_to_string(&self, addr: IpAddr) -> String {
        addr.to_string()
    }

    /// Host name for `addr`, if one is known.
    fn reverse_resolve(&self, addr: IpAddr) -> Option<String>;
}

/// Resolver backed by the operating system's DNS configuration.
pub struct SystemResolver {
    inner: Resolver,
}

impl SystemResolver {
    pub fn from_system_conf() -> Result<Self, ResolveError> {
        Ok(Self {
            inner: Resolver::from_system_conf()?,
        })
    }
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver").finish_non_exhaustive()
    }
}

impl Resolve for SystemResolver {
    fn resolve_address(&self, host: &str) -> Result<IpAddr, ResolveError> {
        if let Ok(addr) = host.parse() {
            return Ok(addr);
        }
        let lookup = self.inner.lookup_ip(host).map_err(|e| ResolveError::Lookup {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        lookup
            .iter()
            .next()
            .ok_or_else(|| ResolveError::NotFound(host.to_string()))
    }

    fn reverse_resolve(&self, addr: IpAddr) -> Option<String> {
        match self.inner.reverse_lookup(addr) {
            Ok(names) => names
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string()),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "Reverse lookup failed");
                None
            }
        }
    }
}

/// Resolver answering from a fixed table; literals always resolve.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, IpAddr>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, addr: IpAddr) -> Self {
        self.hosts.insert(host.into().to_ascii_lowercase(), addr);
        self
    }
}

impl Resolve for StaticResolver {
    fn resolve_address(&self, host: &str) -> Result<IpAddr, ResolveError> {
        if let Ok(addr) = host.parse() {
            return Ok(addr);
        }
        self.hosts
            .get(&host.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| ResolveError::NotFound(host.to_string()))
    }

    fn reverse_resolve(&self, addr: IpAddr) -> Option<String> {
        self.hosts
            .iter()
            .filter(|(_, a)| **a == addr)
            .map(|(host, _)| host.clone())
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_resolver() {
        let resolver = StaticResolver::new().with_host("NAS.example.com", "10.1.2.3".parse().unwrap());

        assert_eq!(
            resolver.resolve_address("nas.example.com").unwrap(),
            "10.1.2.3".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            resolver.resolve_address("::1").unwrap(),
            "::1".parse::<IpAddr>().unwrap()
        );
        assert!(matches!(
            resolver.resolve_address("missing"),
            Err(ResolveError::NotFound(_))
        ));
        assert_eq!(
            resolver.reverse_resolve("10.1.2.3".parse().unwrap()).as_deref(),
            Some("nas.example.com")
        );
        assert_eq!(resolver.reverse_resolve("10.9.9.9".parse().unwrap()), None);
    }
}
