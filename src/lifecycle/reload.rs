//! Reload loop for a watched configuration file.
//!
//! # Responsibilities
//! - Load the file and derive the peer table in one step
//! - Publish the table only when the load and the build both succeed
//! - React to change events until shutdown is triggered
//!
//! # Design Decisions
//! - Bursts of change events collapse into one reload
//! - The tree is installed in the store before the table is published, so a
//!   reader may briefly see the new tree next to the previous table

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::{broadcast, mpsc};

use crate::config::error::Result;
use crate::config::store::ConfigStore;
use crate::config::watcher::ChangeEvent;
use crate::net::resolve::Resolve;
use crate::peers::{PeerDefaults, PeerTable};

/// Owns the store and the published peer table.
pub struct Reloader {
    store: ConfigStore,
    resolver: Arc<dyn Resolve>,
    defaults: PeerDefaults,
    peers: ArcSwapOption<PeerTable>,
}

impl Reloader {
    pub fn new(store: ConfigStore, resolver: Arc<dyn Resolve>, defaults: PeerDefaults) -> Self {
        Self {
            store,
            resolver,
            defaults,
            peers: ArcSwapOption::empty(),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// The published peer table, if a load has succeeded.
    pub fn peers(&self) -> Option<Arc<PeerTable>> {
        self.peers.load_full()
    }

    /// Load the file and publish a new table. Blocks on file and DNS I/O.
    ///
    /// On failure both the installed tree and the published table are left
    /// as they were.
    pub fn reload(&self) -> Result<Arc<PeerTable>> {
        let (_, table) = self
            .store
            .load_and_then(|tree| PeerTable::from_tree(tree, self.resolver.as_ref(), &self.defaults))?;

        let table = Arc::new(table);
        self.peers.store(Some(table.clone()));
        Ok(table)
    }

    /// Reload on every change event until `shutdown` fires or the event
    /// channel closes.
    pub async fn run(
        self: Arc<Self>,
        mut changes: mpsc::UnboundedReceiver<ChangeEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                event = changes.recv() => {
                    let Some(event) = event else {
                        tracing::debug!("Change channel closed");
                        break;
                    };
                    while changes.try_recv().is_ok() {}

                    tracing::debug!(file = %event.path.display(), "Reloading configuration");
                    let reloader = Arc::clone(&self);
                    match tokio::task::spawn_blocking(move || reloader.reload()).await {
                        Ok(Ok(table)) => tracing::info!(
                            file = %self.store.path().display(),
                            clients = table.clients.len(),
                            realms = table.realms.len(),
                            "Configuration reloaded"
                        ),
                        Ok(Err(e)) => tracing::error!(
                            error = %e,
                            "Reload failed, keeping previous configuration"
                        ),
                        Err(e) => tracing::error!(error = %e, "Reload task failed"),
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reload loop stopping");
                    break;
                }
            }
        }
    }
}

impl std::fmt::Debug for Reloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reloader")
            .field("store", &self.store)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
