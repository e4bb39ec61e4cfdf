//! Shared helpers for the integration tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A scratch directory holding configuration files.
pub struct ConfigDir {
    dir: TempDir,
}

impl ConfigDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Absolute path of `name` inside the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `text` to `name`, creating parent directories, and return its path.
    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }
}

/// A small but complete server configuration.
#[allow(dead_code)]
pub const SERVER_CONF: &str = "\
# global settings
prefix = /usr/local
confdir = ${prefix}/etc/raddb

client 127.0.0.1 {
    secret = testing123
    shortname = localhost
}

realm example.org {
    authhost = 192.0.2.10:1645
    accthost = 192.0.2.10:1646
    secret = realmsecret
    nostrip
}

realm LOCAL.lan {
    authhost = LOCAL
    secret = local
}
";
