//! Configuration loading from disk.
//!
//! # Responsibilities
//! - Open a file and run the section reader over it
//! - Track the files currently being read so `$INCLUDE` cannot recurse
//! - Carry the limits that bound nesting depth and line length

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::error::{ConfigError, Location, Result};
use crate::config::reader::SectionReader;
use crate::config::tree::ConfigTree;

/// Limits applied while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Maximum section nesting, counting included files as one level each.
    pub max_depth: usize,

    /// Maximum length in bytes of a physical line and of an expanded value.
    pub max_line_length: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_line_length: 8192,
        }
    }
}

/// Reads configuration files into trees.
#[derive(Debug, Default)]
pub struct Loader {
    options: LoaderOptions,
    /// Canonical paths of the files currently being read, outermost first.
    include_stack: Vec<PathBuf>,
}

impl Loader {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            include_stack: Vec::new(),
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load a configuration file and everything it includes.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<ConfigTree> {
        self.load_nested(path.as_ref(), 0, None)
    }

    /// Parse configuration text. `name` is used in diagnostics and as the
    /// base for relative `$INCLUDE` paths.
    pub fn parse_str(&mut self, name: impl AsRef<Path>, text: &str) -> Result<ConfigTree> {
        self.parse_reader(name, text.as_bytes())
    }

    /// Parse configuration read from `source`.
    pub fn parse_reader<R: BufRead>(&mut self, name: impl AsRef<Path>, source: R) -> Result<ConfigTree> {
        let file: Arc<Path> = Arc::from(name.as_ref());
        SectionReader::new(self, file, source, 0).read()
    }

    pub(crate) fn load_nested(
        &mut self,
        path: &Path,
        depth: usize,
        origin: Option<&Location>,
    ) -> Result<ConfigTree> {
        let location = origin
            .cloned()
            .unwrap_or_else(|| Location::new(path, 0));

        let file = File::open(path).map_err(|e| ConfigError::io(location.clone(), path, e))?;
        let canonical = fs::canonicalize(path).map_err(|e| ConfigError::io(location.clone(), path, e))?;
        if self.include_stack.contains(&canonical) {
            return Err(ConfigError::semantic(
                location,
                format!("Include cycle: {} is already being read", path.display()),
            ));
        }

        self.include_stack.push(canonical);
        let result = SectionReader::new(self, Arc::from(path), BufReader::new(file), depth).read();
        self.include_stack.pop();

        if let Ok(tree) = &result {
            tracing::debug!(file = %path.display(), items = tree.len(), "Configuration file read");
        }
        result
    }
}

impl ConfigTree {
    /// Load `path` with default limits.
    pub fn load(path: impl AsRef<Path>) -> Result<ConfigTree> {
        Loader::default().load(path)
    }

    /// Parse configuration text with default limits.
    pub fn parse_str(name: impl AsRef<Path>, text: &str) -> Result<ConfigTree> {
        Loader::default().parse_str(name, text)
    }
}
