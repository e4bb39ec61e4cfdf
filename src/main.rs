//! `radconf` command-line entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use radconf::config::watcher::{ChangeEvent, ConfigWatcher};
use radconf::config::{dump, ConfigStore, Loader, LoaderOptions};
use radconf::lifecycle::signals::Signals;
use radconf::lifecycle::{Reloader, Shutdown, SignalEvent};
use radconf::net::{Resolve, StaticResolver, SystemResolver};
use radconf::peers::{PeerDefaults, PeerTable};

#[derive(Parser)]
#[command(name = "radconf")]
#[command(about = "Check, inspect and watch hierarchical RADIUS configuration files", long_about = None)]
struct Cli {
    /// Log level for this crate; RUST_LOG takes precedence
    #[arg(long, global = true, env = "RADCONF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Deepest allowed section nesting, counting $INCLUDE levels
    #[arg(long, global = true, default_value_t = LoaderOptions::default().max_depth)]
    max_depth: usize,

    /// Longest accepted line, after substitution
    #[arg(long, global = true, default_value_t = LoaderOptions::default().max_line_length)]
    max_line_length: usize,

    /// Only resolve literal addresses; never query DNS
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the file and build clients and realms
    Check { file: PathBuf },
    /// Print the parsed tree
    Dump { file: PathBuf },
    /// Print clients and realms as JSON
    Peers { file: PathBuf },
    /// Reload on file change or SIGHUP until SIGINT/SIGTERM
    Watch { file: PathBuf },
}

impl Cli {
    fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            max_depth: self.max_depth,
            max_line_length: self.max_line_length,
        }
    }

    fn resolver(&self) -> Result<Arc<dyn Resolve>, Box<dyn std::error::Error>> {
        if self.offline {
            return Ok(Arc::new(StaticResolver::new()));
        }
        Ok(Arc::new(SystemResolver::from_system_conf()?))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    radconf::observability::init(cli.log_level.as_deref());

    let options = cli.loader_options();
    match &cli.command {
        Commands::Check { file } => {
            let resolver = cli.resolver()?;
            let table = build_peers(file, options, resolver.as_ref())?;
            println!(
                "{}: OK ({} clients, {} realms)",
                file.display(),
                table.clients.len(),
                table.realms.len()
            );
        }
        Commands::Dump { file } => {
            let tree = Loader::new(options).load(file)?;
            print!("{}", dump(tree.root()));
        }
        Commands::Peers { file } => {
            let resolver = cli.resolver()?;
            let table = build_peers(file, options, resolver.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        Commands::Watch { file } => {
            // The system resolver owns a runtime of its own; build it outside ours.
            let resolver = cli.resolver()?;
            watch(file, options, resolver)?;
        }
    }

    Ok(())
}

fn build_peers(
    file: &Path,
    options: LoaderOptions,
    resolver: &dyn Resolve,
) -> Result<PeerTable, Box<dyn std::error::Error>> {
    let tree = Loader::new(options).load(file)?;
    Ok(PeerTable::from_tree(&tree, resolver, &PeerDefaults::default())?)
}

fn watch(
    file: &Path,
    options: LoaderOptions,
    resolver: Arc<dyn Resolve>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = ConfigStore::new(file, options);
    let reloader = Arc::new(Reloader::new(store, resolver, PeerDefaults::default()));

    let table = reloader.reload()?;
    tracing::info!(
        file = %file.display(),
        clients = table.clients.len(),
        realms = table.realms.len(),
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (watcher, changes) = ConfigWatcher::new(file);
        let hangup = watcher.sender();
        let _watcher = watcher.run()?;

        let shutdown = Shutdown::new();
        let stop = shutdown.subscribe();
        let mut signals = Signals::new()?;
        let trigger = shutdown.clone();
        let reload_path = file.to_path_buf();
        tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    SignalEvent::Reload => {
                        let event = ChangeEvent { path: reload_path.clone() };
                        if hangup.send(event).is_err() {
                            break;
                        }
                    }
                    SignalEvent::Shutdown => {
                        trigger.trigger();
                        break;
                    }
                }
            }
        });

        Arc::clone(&reloader).run(changes, stop).await;
        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    tracing::info!("Shutdown complete");
    Ok(())
}
