//! `${name}` variable substitution in pair values.
//!
//! A reference resolves to the first pair named `name` already read in the
//! current section, then in each enclosing section outward. Substituted
//! text is not rescanned. A `${` without a closing `}` is copied verbatim.

use crate::config::error::{ConfigError, Location, Result};
use crate::config::tree::{ConfigTree, NodeId, SectionRef};

/// Look `name` up in `section` and then its ancestors. Names match
/// exactly; an empty name never resolves.
pub(crate) fn lookup<'a>(section: SectionRef<'a>, name: &str) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }
    let mut scope = Some(section);
    while let Some(current) = scope {
        if let Some(value) = current.value(name) {
            return Some(value);
        }
        scope = current.parent();
    }
    None
}

/// Expand every `${name}` in `raw`.
///
/// Fails with a semantic error on an unknown variable and with a resource
/// error when the expansion grows past `max_len` bytes.
pub(crate) fn substitute(
    tree: &ConfigTree,
    section: NodeId,
    raw: &str,
    max_len: usize,
    location: &Location,
) -> Result<String> {
    let scope = SectionRef { tree, id: section };
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        let after_open = &rest[start + 2..];
        let close = match after_open.find('}') {
            Some(close) => close,
            None => break,
        };

        out.push_str(&rest[..start]);
        let name = &after_open[..close];
        let value = lookup(scope, name).ok_or_else(|| {
            ConfigError::semantic(location.clone(), format!("Unknown variable \"{}\"", name))
        })?;
        out.push_str(value);
        check_len(&out, max_len, location)?;

        rest = &after_open[close + 1..];
    }

    out.push_str(rest);
    check_len(&out, max_len, location)?;
    Ok(out)
}

fn check_len(out: &str, max_len: usize, location: &Location) -> Result<()> {
    if out.len() > max_len {
        return Err(ConfigError::resource(
            location.clone(),
            format!("line too long after variable expansion (limit {} bytes)", max_len),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::error::ErrorKind;
    use crate::config::loader::{Loader, LoaderOptions};

    fn parse(text: &str) -> crate::config::error::Result<crate::config::ConfigTree> {
        Loader::default().parse_str("vars.conf", text)
    }

    #[test]
    fn test_same_section_reference() {
        let tree = parse("A = 1\nB = ${A}x\n").unwrap();
        assert_eq!(tree.root().value("B"), Some("1x"));
    }

    #[test]
    fn test_ancestor_reference() {
        let text = "\
confdir = /etc/raddb
modules {
    files {
        usersfile = ${confdir}/users
    }
}
";
        let tree = parse(text).unwrap();
        let files = tree
            .root()
            .find_subsection("modules")
            .and_then(|m| m.find_subsection("files"))
            .unwrap();
        assert_eq!(files.value("usersfile"), Some("/etc/raddb/users"));
    }

    #[test]
    fn test_nearest_scope_wins() {
        let text = "dir = outer\nsub {\n  dir = inner\n  path = ${dir}/x\n}\n";
        let tree = parse(text).unwrap();
        let sub = tree.root().find_subsection("sub").unwrap();
        assert_eq!(sub.value("path"), Some("inner/x"));
    }

    #[test]
    fn test_only_earlier_pairs_are_visible() {
        let err = parse("B = ${A}\nA = 1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.location().line, 1);
    }

    #[test]
    fn test_unknown_variable_fails() {
        let err = parse("x = ${nowhere}\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert!(err.to_string().contains("Unknown variable \"nowhere\""));
    }

    #[test]
    fn test_empty_reference_fails() {
        let err = parse("x = 5\ny = \"${}\"\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.location().line, 2);
        assert!(err.to_string().contains("Unknown variable \"\""));
    }

    #[test]
    fn test_unterminated_reference_is_verbatim() {
        let tree = parse("a = 1\nb = \"${a}-${a\"\n").unwrap();
        assert_eq!(tree.root().value("b"), Some("1-${a"));
    }

    #[test]
    fn test_substituted_text_not_rescanned() {
        let tree = parse("a = \"${b\"\nc = \"${a}}\"\n").unwrap();
        assert_eq!(tree.root().value("c"), Some("${b}"));
    }

    #[test]
    fn test_expansion_limit() {
        let options = LoaderOptions {
            max_line_length: 16,
            ..LoaderOptions::default()
        };
        let err = Loader::new(options)
            .parse_str("big.conf", "a = 0123456789\nb = ${a}${a}\n")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert_eq!(err.location().line, 2);
    }
}
