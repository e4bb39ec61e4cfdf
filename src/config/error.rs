//! Configuration error types.
//!
//! # Design Decisions
//! - Every error carries the file and line it originated from
//! - Errors are grouped into four kinds so callers can apply policy by kind
//! - Loading is all-or-nothing: an error means no tree was produced

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Position in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Arc<Path>,
    /// 1-based line number; 0 when the error concerns the file as a whole.
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<Arc<Path>>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}[{}]", self.file.display(), self.line)
        }
    }
}

/// Broad classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file could not be opened or read.
    Io,
    /// Malformed line, unexpected or missing brace, wrong field count.
    Syntax,
    /// Forbidden name, unknown variable, include cycle, bad typed value.
    Semantic,
    /// A line, value or nesting level exceeds a configured maximum.
    Resource,
}

/// Error type for configuration loading and extraction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{location}: cannot read {}: {source}", .path.display())]
    Io {
        location: Location,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{location}: {message}")]
    Syntax { location: Location, message: String },

    #[error("{location}: {message}")]
    Semantic { location: Location, message: String },

    #[error("{location}: {message}")]
    Resource { location: Location, message: String },
}

impl ConfigError {
    pub fn io(location: Location, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            location,
            path: path.into(),
            source,
        }
    }

    pub fn syntax(location: Location, message: impl Into<String>) -> Self {
        Self::Syntax {
            location,
            message: message.into(),
        }
    }

    pub fn semantic(location: Location, message: impl Into<String>) -> Self {
        Self::Semantic {
            location,
            message: message.into(),
        }
    }

    pub fn resource(location: Location, message: impl Into<String>) -> Self {
        Self::Resource {
            location,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Syntax { .. } => ErrorKind::Syntax,
            ConfigError::Semantic { .. } => ErrorKind::Semantic,
            ConfigError::Resource { .. } => ErrorKind::Resource,
        }
    }

    /// Where the error was detected.
    pub fn location(&self) -> &Location {
        match self {
            ConfigError::Io { location, .. }
            | ConfigError::Syntax { location, .. }
            | ConfigError::Semantic { location, .. }
            | ConfigError::Resource { location, .. } => location,
        }
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::new(Path::new("radiusd.conf"), 12);
        assert_eq!(loc.to_string(), "radiusd.conf[12]");

        let whole_file = Location::new(Path::new("radiusd.conf"), 0);
        assert_eq!(whole_file.to_string(), "radiusd.conf");
    }

    #[test]
    fn test_error_kind_and_message() {
        let err = ConfigError::syntax(
            Location::new(Path::new("a.conf"), 3),
            "Unexpected end of section",
        );
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.location().line, 3);
        assert_eq!(err.to_string(), "a.conf[3]: Unexpected end of section");
    }
}
