//! Configuration file watcher for hot reload.
//!
//! The watcher only reports that the file changed; the owner of the
//! [`ConfigStore`](crate::config::store::ConfigStore) performs the reload so
//! there is a single writer. Files pulled in with `$INCLUDE` are not watched.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A change notification for the watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    change_tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for change notifications.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            change_tx,
        }, change_rx)
    }

    /// Sender feeding the same channel, for reloads requested by other
    /// sources such as SIGHUP.
    pub fn sender(&self) -> mpsc::UnboundedSender<ChangeEvent> {
        self.change_tx.clone()
    }

    /// Start watching the file. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(file = %path.display(), "Config file change detected");
                        let _ = tx.send(ChangeEvent { path: path.clone() });
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}
