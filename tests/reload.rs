//! Reload protocol tests: store, peer table and file watcher together.

use std::sync::Arc;
use std::time::Duration;

use radconf::config::watcher::ConfigWatcher;
use radconf::config::{ConfigStore, ErrorKind, LoaderOptions};
use radconf::lifecycle::{Reloader, Shutdown};
use radconf::net::{Resolve, StaticResolver};
use radconf::peers::{PeerDefaults, PeerTable};

mod common;
use common::{ConfigDir, SERVER_CONF};

fn reloader(path: &std::path::Path) -> Arc<Reloader> {
    let store = ConfigStore::new(path, LoaderOptions::default());
    let resolver: Arc<dyn Resolve> = Arc::new(StaticResolver::new());
    Arc::new(Reloader::new(store, resolver, PeerDefaults::default()))
}

#[test]
fn test_peer_table_from_server_conf() {
    let dir = ConfigDir::new();
    let path = dir.write("radius.conf", SERVER_CONF);
    let reloader = reloader(&path);

    let table = reloader.reload().unwrap();
    assert_eq!(table.clients.len(), 1);
    assert_eq!(table.clients[0].shortname, "localhost");
    assert_eq!(table.clients[0].line, 5);

    let remote = &table.realms[0];
    assert_eq!(remote.realm, "example.org");
    assert_eq!((remote.auth_port, remote.acct_port), (1645, 1646));
    assert!(!remote.strip_realm);

    let local = &table.realms[1];
    assert_eq!(local.ipaddr, None);
    assert_eq!((local.auth_port, local.acct_port), (1812, 1813));
}

#[test]
fn test_bad_reload_keeps_tree_and_peers() {
    let dir = ConfigDir::new();
    let path = dir.write("radius.conf", SERVER_CONF);
    let reloader = reloader(&path);
    let table = reloader.reload().unwrap();
    let tree = reloader.store().current().unwrap();

    let broken = [
        ("client 127.0.0.1 {\n secret = x\n", ErrorKind::Syntax),
        ("realm r {\n secret = x\n}\n", ErrorKind::Semantic),
        ("$INCLUDE missing.conf\n", ErrorKind::Io),
    ];
    for (text, kind) in broken {
        dir.write("radius.conf", text);
        let err = reloader.reload().unwrap_err();
        assert_eq!(err.kind(), kind, "{:?}", text);

        assert!(Arc::ptr_eq(&tree, &reloader.store().current().unwrap()));
        assert!(Arc::ptr_eq(&table, &reloader.peers().unwrap()));
    }
}

#[test]
fn test_snapshot_survives_reload() {
    let dir = ConfigDir::new();
    let path = dir.write("radius.conf", "port = 1812\n");
    let store = ConfigStore::new(&path, LoaderOptions::default());
    let old = store.load().unwrap();

    dir.write("radius.conf", "port = 1645\n");
    let new = store.load().unwrap();

    assert_eq!(old.root().value("port"), Some("1812"));
    assert_eq!(new.root().value("port"), Some("1645"));

    store.clear();
    assert!(store.current().is_none());
    assert_eq!(old.root().value("port"), Some("1812"));
}

#[test]
fn test_peer_json_omits_secrets() {
    let dir = ConfigDir::new();
    let path = dir.write("radius.conf", SERVER_CONF);
    let tree = radconf::ConfigTree::load(&path).unwrap();
    let table = PeerTable::from_tree(&tree, &StaticResolver::new(), &PeerDefaults::default()).unwrap();

    let json: serde_json::Value = serde_json::to_value(&table).unwrap();
    assert_eq!(json["clients"][0]["ipaddr"], "127.0.0.1");
    assert_eq!(json["realms"][1]["ipaddr"], serde_json::Value::Null);
    assert!(json["clients"][0].get("secret").is_none());
    assert!(json["realms"][0].get("secret").is_none());
}

#[tokio::test]
async fn test_file_change_triggers_reload() {
    let dir = ConfigDir::new();
    let path = dir.write("radius.conf", "client 10.0.0.1 {\n secret = one\n}\n");
    let reloader = reloader(&path);
    reloader.reload().unwrap();

    let (watcher, changes) = ConfigWatcher::new(&path);
    let _watcher = watcher.run().unwrap();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(Arc::clone(&reloader).run(changes, shutdown.subscribe()));

    dir.write(
        "radius.conf",
        "client 10.0.0.1 {\n secret = one\n}\nclient 10.0.0.2 {\n secret = two\n}\n",
    );

    let mut reloaded = false;
    for _ in 0..250 {
        if reloader.peers().map(|p| p.clients.len()) == Some(2) {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(reloaded, "file change was not picked up");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}
