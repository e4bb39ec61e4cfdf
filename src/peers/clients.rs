//! Client list built from `client <host> { ... }` sections.

use crate::config::error::{ConfigError, Result};
use crate::config::extract::{parse_section, FieldSpec, Target};
use crate::config::tree::SectionRef;
use crate::net::resolve::Resolve;
use crate::peers::types::Client;
use crate::peers::validation::{check_len, MAX_SECRET_LEN, MAX_SHORTNAME_LEN};

/// Build one [`Client`] per `client` subsection of `root`, in file order.
pub fn generate_clients(root: SectionRef<'_>, resolver: &dyn Resolve) -> Result<Vec<Client>> {
    let mut clients = Vec::new();

    for section in root.subsections_named("client") {
        let location = section.location();
        let hostname = section
            .name2()
            .ok_or_else(|| ConfigError::semantic(location.clone(), "Missing client name"))?;

        let mut secret = None;
        let mut shortname = None;
        parse_section(
            section,
            &mut [
                FieldSpec::new("secret", Target::String(&mut secret)),
                FieldSpec::new("shortname", Target::String(&mut shortname)),
            ],
            resolver,
        )?;

        let secret = secret.ok_or_else(|| {
            ConfigError::semantic(location.clone(), "No shared secret supplied for client")
        })?;
        let shortname = shortname.unwrap_or_default();
        check_len("Secret", &secret, MAX_SECRET_LEN, &location)?;
        check_len("NAS short name", &shortname, MAX_SHORTNAME_LEN, &location)?;

        let ipaddr = resolver.resolve_address(hostname).map_err(|e| {
            ConfigError::semantic(
                location.clone(),
                format!("Can't find IP address for client {}: {}", hostname, e),
            )
        })?;
        let longname = resolver
            .reverse_resolve(ipaddr)
            .unwrap_or_else(|| resolver.address_to_string(ipaddr));

        tracing::debug!(client = %hostname, %ipaddr, "Client added");
        clients.push(Client {
            hostname: hostname.to_string(),
            ipaddr,
            secret,
            shortname,
            longname,
            line: section.line(),
        });
    }

    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;
    use crate::config::ConfigTree;
    use crate::net::resolve::StaticResolver;

    fn resolver() -> StaticResolver {
        StaticResolver::new().with_host("nas1.example.com", "192.0.2.1".parse().unwrap())
    }

    #[test]
    fn test_clients_in_file_order() {
        let text = "\
client nas1.example.com {
    secret = testing123
    shortname = nas1
}
client 10.0.0.2 {
    secret = other
}
";
        let tree = ConfigTree::parse_str("clients.conf", text).unwrap();
        let clients = generate_clients(tree.root(), &resolver()).unwrap();

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].hostname, "nas1.example.com");
        assert_eq!(clients[0].ipaddr.to_string(), "192.0.2.1");
        assert_eq!(clients[0].longname, "nas1.example.com");
        assert_eq!(clients[0].shortname, "nas1");
        assert_eq!(clients[1].secret, "other");
        assert_eq!(clients[1].shortname, "");
        assert_eq!(clients[1].longname, "10.0.0.2");
        assert_eq!(clients[1].line, 5);
    }

    #[test]
    fn test_client_errors() {
        let cases = [
            ("client {\n secret = x\n}\n", "Missing client name"),
            ("client 10.0.0.1 {\n}\n", "No shared secret"),
            ("client 10.0.0.1 {\n secret = 0123456789012345678901234567890123\n}\n", "Secret of length"),
            ("client ghost.invalid {\n secret = x\n}\n", "Can't find IP address"),
        ];
        for (text, expected) in cases {
            let tree = ConfigTree::parse_str("clients.conf", text).unwrap();
            let err = generate_clients(tree.root(), &resolver()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Semantic);
            assert!(err.to_string().contains(expected), "{} vs {}", err, expected);
            assert_eq!(err.location().line, 1);
        }
    }
}
