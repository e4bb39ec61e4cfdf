//! Declarative extraction of typed fields from a section.
//!
//! A caller lists the pairs it cares about together with where each value
//! goes and an optional default. [`parse_section`] fills the targets in
//! order and stops at the first field that cannot be converted; fields
//! already written stay written.

use std::net::{IpAddr, Ipv4Addr};

use crate::config::error::{ConfigError, Location, Result};
use crate::config::tree::SectionRef;
use crate::net::resolve::Resolve;

/// Destination of one extracted field.
#[derive(Debug)]
pub enum Target<'t> {
    /// `yes`/`on` or `no`/`off`, case-insensitive.
    Bool(&'t mut bool),
    /// Leading integer in C `strtol` style; trailing text is ignored.
    Integer(&'t mut i64),
    /// Any text; `None` when neither the pair nor a default exists.
    String(&'t mut Option<String>),
    /// `*` for the wildcard address, otherwise a resolvable host.
    Address(&'t mut IpAddr),
}

/// One entry of an extraction table.
#[derive(Debug)]
pub struct FieldSpec<'t> {
    pub name: &'t str,
    pub target: Target<'t>,
    pub default: Option<&'t str>,
}

impl<'t> FieldSpec<'t> {
    pub fn new(name: &'t str, target: Target<'t>) -> Self {
        Self {
            name,
            target,
            default: None,
        }
    }

    pub fn with_default(mut self, default: &'t str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Fill every target in `fields` from the direct pairs of `section`.
pub fn parse_section(section: SectionRef<'_>, fields: &mut [FieldSpec<'_>], resolver: &dyn Resolve) -> Result<()> {
    for field in fields.iter_mut() {
        let pair = section.find_pair(Some(field.name));
        let location = pair
            .map(|p| p.location())
            .unwrap_or_else(|| section.location());
        let value = pair.map(|p| p.value()).or(field.default);

        match &mut field.target {
            Target::Bool(target) => {
                let value = required(value, field.name, &location)?;
                **target = parse_bool(value).ok_or_else(|| {
                    ConfigError::semantic(
                        location.clone(),
                        format!("Bad value \"{}\" for boolean variable {}", value, field.name),
                    )
                })?;
                tracing::debug!("Config: {}.{} = {}", section.name1(), field.name, value);
            }
            Target::Integer(target) => {
                let value = required(value, field.name, &location)?;
                **target = parse_integer(value);
                tracing::debug!("Config: {}.{} = {}", section.name1(), field.name, **target);
            }
            Target::String(target) => {
                **target = value.map(str::to_string);
                tracing::debug!(
                    "Config: {}.{} = \"{}\"",
                    section.name1(),
                    field.name,
                    value.unwrap_or("(null)")
                );
            }
            Target::Address(target) => {
                let value = required(value, field.name, &location)?;
                **target = parse_address(value, resolver, &location)?;
                tracing::debug!(
                    "Config: {}.{} = {} IP address [{}]",
                    section.name1(),
                    field.name,
                    value,
                    resolver.address_to_string(**target)
                );
            }
        }
    }
    Ok(())
}

fn required<'v>(value: Option<&'v str>, name: &str, location: &Location) -> Result<&'v str> {
    value.ok_or_else(|| {
        ConfigError::semantic(location.clone(), format!("Missing mandatory field \"{}\"", name))
    })
}

pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("on") {
        Some(true)
    } else if value.eq_ignore_ascii_case("no") || value.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}

/// Parse the leading integer of `value` the way C `strtol(value, 0, 0)` does:
/// optional sign, `0x` hex, leading-`0` octal, else decimal. Parsing stops at
/// the first character that is not a digit of the base; no digits gives 0.
/// Out-of-range values saturate.
pub fn parse_integer(value: &str) -> i64 {
    let s = value.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if (s.starts_with("0x") || s.starts_with("0X"))
        && s[2..].chars().next().is_some_and(|c| c.is_ascii_hexdigit())
    {
        (16, &s[2..])
    } else if s.starts_with('0') {
        (8, s)
    } else {
        (10, s)
    };

    let mut acc: i64 = 0;
    for c in digits.chars() {
        let digit = match c.to_digit(radix) {
            Some(d) => i64::from(d),
            None => break,
        };
        acc = acc.saturating_mul(i64::from(radix));
        acc = if negative {
            acc.saturating_sub(digit)
        } else {
            acc.saturating_add(digit)
        };
    }
    acc
}

fn parse_address(value: &str, resolver: &dyn Resolve, location: &Location) -> Result<IpAddr> {
    if value == "*" {
        return Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
    resolver.resolve_address(value).map_err(|e| {
        ConfigError::semantic(
            location.clone(),
            format!("Can't find IP address for host {}: {}", value, e),
        )
    })
}
