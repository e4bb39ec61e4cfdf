//! Field limits for peer entries.
//!
//! # Design Decisions
//! - Limits match the fixed-size fields of the on-wire peer tables
//! - Checks report the section's location, not the pair's

use crate::config::error::{ConfigError, Location, Result};

/// Longest accepted shared secret.
pub const MAX_SECRET_LEN: usize = 31;
/// Longest accepted client short name.
pub const MAX_SHORTNAME_LEN: usize = 32;
/// Longest accepted realm or server name.
pub const MAX_NAME_LEN: usize = 63;

pub(crate) fn check_len(what: &str, value: &str, max: usize, location: &Location) -> Result<()> {
    if value.len() > max {
        return Err(ConfigError::semantic(
            location.clone(),
            format!(
                "{} of length {} is greater than the allowed maximum of {}",
                what,
                value.len(),
                max
            ),
        ));
    }
    Ok(())
}
