//! Installed configuration and the reload/replace protocol.
//!
//! # Responsibilities
//! - Hold the currently installed tree behind an atomically swappable pointer
//! - Parse a replacement in isolation and install it only on full success
//! - Hand out `Arc` snapshots that stay valid across reloads
//!
//! # Design Decisions
//! - One writer (whoever calls `load`); readers never see a partial tree
//! - A failed load leaves the installed tree untouched
//! - The previous tree is released when its last snapshot is dropped

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::error::Result;
use crate::config::loader::{Loader, LoaderOptions};
use crate::config::tree::ConfigTree;

/// Owner of the installed configuration tree.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    options: LoaderOptions,
    current: ArcSwapOption<ConfigTree>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, options: LoaderOptions) -> Self {
        Self {
            path: path.into(),
            options,
            current: ArcSwapOption::empty(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and install the result.
    pub fn load(&self) -> Result<Arc<ConfigTree>> {
        self.load_and_then(|_| Ok(())).map(|(tree, ())| tree)
    }

    /// Read the file, run `build` against the new tree, and install the tree
    /// only when both succeed.
    ///
    /// Consumers use `build` to derive their own structures so a tree that
    /// parses but fails consumer checks is never installed.
    pub fn load_and_then<T, F>(&self, build: F) -> Result<(Arc<ConfigTree>, T)>
    where
        F: FnOnce(&ConfigTree) -> Result<T>,
    {
        let tree = Loader::new(self.options.clone()).load(&self.path)?;
        let derived = build(&tree)?;

        let tree = Arc::new(tree);
        let previous = self.current.swap(Some(tree.clone()));
        tracing::info!(
            file = %self.path.display(),
            items = tree.len(),
            replaced = previous.is_some(),
            "Configuration installed"
        );
        Ok((tree, derived))
    }

    /// Snapshot of the installed tree, if any.
    pub fn current(&self) -> Option<Arc<ConfigTree>> {
        self.current.load_full()
    }

    /// Release the installed tree.
    pub fn clear(&self) {
        self.current.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::{ConfigError, ErrorKind};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_failed_reload_keeps_previous_tree() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("radiusd.conf");
        fs::write(&path, "port = 1812\n").unwrap();

        let store = ConfigStore::new(&path, LoaderOptions::default());
        assert!(store.current().is_none());
        let first = store.load().unwrap();
        assert_eq!(first.root().value("port"), Some("1812"));

        fs::write(&path, "port = ${undefined}\n").unwrap();
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        let installed = store.current().unwrap();
        assert!(Arc::ptr_eq(&installed, &first));

        fs::write(&path, "port = 1645\n").unwrap();
        store.load().unwrap();
        assert_eq!(store.current().unwrap().root().value("port"), Some("1645"));
        // Old snapshots stay readable after replacement.
        assert_eq!(first.root().value("port"), Some("1812"));

        store.clear();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_build_failure_blocks_install() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("radiusd.conf");
        fs::write(&path, "a = 1\n").unwrap();

        let store = ConfigStore::new(&path, LoaderOptions::default());
        let result = store.load_and_then(|tree| -> Result<()> {
            Err(ConfigError::semantic(tree.root().location(), "rejected"))
        });
        assert!(result.is_err());
        assert!(store.current().is_none());
    }
}
