//! Realm list built from `realm <name> { ... }` sections.
//!
//! # Design Decisions
//! - `authhost` and `secret` are mandatory; `accthost` is optional
//! - `host:port` splits at the first colon; no port means the default
//! - A bare IPv6 literal has no port; `[addr]:port` gives it one
//! - `nostrip`, `noacct` and `trusted` are flags: presence sets them
//! - `authhost = LOCAL` handles the realm locally and is not resolved

use std::net::IpAddr;

use crate::config::error::{ConfigError, Location, Result};
use crate::config::extract::{parse_integer, parse_section, FieldSpec, Target};
use crate::config::tree::SectionRef;
use crate::net::resolve::Resolve;
use crate::peers::types::{PeerDefaults, Realm};
use crate::peers::validation::{check_len, MAX_NAME_LEN, MAX_SECRET_LEN};

const LOCAL_SERVER: &str = "LOCAL";

/// Build one [`Realm`] per `realm` subsection of `root`, in file order.
pub fn generate_realms(
    root: SectionRef<'_>,
    resolver: &dyn Resolve,
    defaults: &PeerDefaults,
) -> Result<Vec<Realm>> {
    let mut realms = Vec::new();

    for section in root.subsections_named("realm") {
        let location = section.location();
        let name = section
            .name2()
            .ok_or_else(|| ConfigError::semantic(location.clone(), "Missing realm name"))?;

        let mut authhost = None;
        let mut accthost = None;
        let mut secret = None;
        parse_section(
            section,
            &mut [
                FieldSpec::new("authhost", Target::String(&mut authhost)),
                FieldSpec::new("accthost", Target::String(&mut accthost)),
                FieldSpec::new("secret", Target::String(&mut secret)),
            ],
            resolver,
        )?;

        let authhost = authhost.ok_or_else(|| {
            ConfigError::semantic(location.clone(), "No authhost entry in realm")
        })?;
        let (server, auth_port) = split_host_port(&authhost, defaults.auth_port, &location)?;
        let mut acct_port = match &accthost {
            Some(accthost) => split_host_port(accthost, defaults.acct_port, &location)?.1,
            None => defaults.acct_port,
        };

        check_len("Server name", &server, MAX_NAME_LEN, &location)?;
        check_len("Realm name", name, MAX_NAME_LEN, &location)?;

        let secret = secret.ok_or_else(|| {
            ConfigError::semantic(location.clone(), "No shared secret supplied for realm")
        })?;
        check_len("Secret", &secret, MAX_SECRET_LEN, &location)?;

        let ipaddr = if server == LOCAL_SERVER {
            None
        } else {
            let addr = resolver.resolve_address(&server).map_err(|e| {
                ConfigError::semantic(
                    location.clone(),
                    format!("Can't find IP address for realm server {}: {}", server, e),
                )
            })?;
            Some(addr)
        };

        let has_flag = |flag: &str| section.find_pair(Some(flag)).is_some();
        if has_flag("noacct") {
            acct_port = 0;
        }

        tracing::debug!(realm = %name, server = %server, auth_port, acct_port, "Realm added");
        realms.push(Realm {
            realm: name.to_string(),
            server,
            ipaddr,
            auth_port,
            acct_port,
            secret,
            strip_realm: !has_flag("nostrip"),
            trusted: has_flag("trusted"),
            line: section.line(),
        });
    }

    Ok(realms)
}

/// Split `host[:port]`; the port is read like any integer field.
fn split_host_port(value: &str, default_port: u16, location: &Location) -> Result<(String, u16)> {
    if value.parse::<IpAddr>().is_ok() {
        return Ok((value.to_string(), default_port));
    }
    let split = match value.strip_prefix('[') {
        Some(bracketed) => {
            let invalid = || {
                ConfigError::semantic(location.clone(), format!("Invalid address in \"{}\"", value))
            };
            let (host, rest) = bracketed.split_once(']').ok_or_else(invalid)?;
            if rest.is_empty() {
                return Ok((host.to_string(), default_port));
            }
            Some((host, rest.strip_prefix(':').ok_or_else(invalid)?))
        }
        None => value.split_once(':'),
    };

    match split {
        None => Ok((value.to_string(), default_port)),
        Some((host, port)) => {
            let port = u16::try_from(parse_integer(port)).map_err(|_| {
                ConfigError::semantic(location.clone(), format!("Invalid port in \"{}\"", value))
            })?;
            Ok((host.to_string(), port))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;
    use crate::config::ConfigTree;
    use crate::net::resolve::StaticResolver;
    use std::path::Path;

    fn resolver() -> StaticResolver {
        StaticResolver::new().with_host("proxy.example.net", "198.51.100.7".parse().unwrap())
    }

    #[test]
    fn test_realms() {
        let text = "\
realm example.net {
    authhost = proxy.example.net:1645
    accthost = proxy.example.net
    secret = s
    nostrip
    trusted
}
realm local.lan {
    authhost = LOCAL
    secret = s
    noacct
}
";
        let tree = ConfigTree::parse_str("realms.conf", text).unwrap();
        let realms = generate_realms(tree.root(), &resolver(), &PeerDefaults::default()).unwrap();

        assert_eq!(realms.len(), 2);
        let remote = &realms[0];
        assert_eq!(remote.realm, "example.net");
        assert_eq!(remote.server, "proxy.example.net");
        assert_eq!(remote.ipaddr, Some("198.51.100.7".parse().unwrap()));
        assert_eq!(remote.auth_port, 1645);
        assert_eq!(remote.acct_port, 1813);
        assert!(!remote.strip_realm);
        assert!(remote.trusted);

        let local = &realms[1];
        assert_eq!(local.ipaddr, None);
        assert_eq!(local.auth_port, 1812);
        assert_eq!(local.acct_port, 0);
        assert!(local.strip_realm);
        assert!(!local.trusted);
    }

    #[test]
    fn test_realm_errors() {
        let cases = [
            ("realm {\n authhost = LOCAL\n secret = s\n}\n", "Missing realm name"),
            ("realm a {\n secret = s\n}\n", "No authhost"),
            ("realm a {\n authhost = LOCAL\n}\n", "No shared secret"),
            ("realm a {\n authhost = LOCAL:70000\n secret = s\n}\n", "Invalid port"),
            ("realm a {\n authhost = gone.invalid\n secret = s\n}\n", "Can't find IP address"),
        ];
        for (text, expected) in cases {
            let tree = ConfigTree::parse_str("realms.conf", text).unwrap();
            let err = generate_realms(tree.root(), &resolver(), &PeerDefaults::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Semantic);
            assert!(err.to_string().contains(expected), "{} vs {}", err, expected);
        }
    }

    #[test]
    fn test_split_host_port() {
        let loc = Location::new(Path::new("r.conf"), 1);
        assert_eq!(split_host_port("h", 1, &loc).unwrap(), ("h".to_string(), 1));
        assert_eq!(split_host_port("h:1700x", 1, &loc).unwrap(), ("h".to_string(), 1700));
        assert!(split_host_port("h:-1", 1, &loc).is_err());
    }

    #[test]
    fn test_split_ipv6_host() {
        let loc = Location::new(Path::new("r.conf"), 1);
        assert_eq!(split_host_port("::1", 1812, &loc).unwrap(), ("::1".to_string(), 1812));
        assert_eq!(
            split_host_port("[2001:db8::7]:1645", 1812, &loc).unwrap(),
            ("2001:db8::7".to_string(), 1645)
        );
        assert_eq!(split_host_port("[::1]", 1812, &loc).unwrap(), ("::1".to_string(), 1812));
        assert!(split_host_port("[::1", 1812, &loc).is_err());
        assert!(split_host_port("[::1]1645", 1812, &loc).is_err());
    }

    #[test]
    fn test_ipv6_authhost_resolves() {
        let text = "realm v6.example {\n authhost = \"[::1]:1645\"\n secret = s\n}\n";
        let tree = ConfigTree::parse_str("realms.conf", text).unwrap();
        let realms = generate_realms(tree.root(), &resolver(), &PeerDefaults::default()).unwrap();
        assert_eq!(realms[0].server, "::1");
        assert_eq!(realms[0].ipaddr, Some("::1".parse().unwrap()));
        assert_eq!(realms[0].auth_port, 1645);
    }
}
