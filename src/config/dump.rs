//! Tree-to-text dump for debugging.
//!
//! Pairs are written as `attr = "value"` and sections as
//! `name1 [name2] {` … `}`, one tab per level. The output reads back into
//! an equivalent tree; operators as written are not preserved.
//!
//! One exception: the grammar has no escape for `${`, so a value that holds
//! a literal `${name}` (only possible by joining an unterminated `${` with a
//! later `}` during substitution) is expanded again when the dump is read.

use std::fmt::Write;

use crate::config::tree::{Item, SectionRef};

/// Render the children of `section`.
pub fn dump(section: SectionRef<'_>) -> String {
    let mut out = String::new();
    write_section(&mut out, section, 0);
    out
}

fn write_section(out: &mut String, section: SectionRef<'_>, indent: usize) {
    for item in section.items() {
        let pad = "\t".repeat(indent);
        match item {
            Item::Pair(pair) => {
                let _ = writeln!(out, "{}{} = {}", pad, label(pair.attribute()), quote(pair.value()));
            }
            Item::Section(sub) => {
                match sub.name2() {
                    Some(name2) => {
                        let _ = writeln!(out, "{}{} {} {{", pad, label(sub.name1()), label(name2));
                    }
                    None => {
                        let _ = writeln!(out, "{}{} {{", pad, label(sub.name1()));
                    }
                }
                write_section(out, sub, indent + 1);
                let _ = writeln!(out, "{}}}", pad);
            }
        }
    }
}

/// Names are written bare unless they would not read back as one word.
fn label(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(['#', '"', '\'', '`', '$'])
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '{' | '}' | ';' | '=' | '<' | '>' | '!' | '~'));
    if plain {
        name.to_string()
    } else {
        quote(name)
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
