//! Connection acquisition
//!
//! One physical connection per executor call. The connection and every
//! statement prepared on it are closed when they go out of scope, on success
//! and on every error path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};

/// Opens a fresh connection for each statement execution
///
/// This is the seam where a pool could sit: an implementation may hand out
/// pooled connections as long as each call gets exclusive use of one.
pub trait Connector: Send + Sync {
    /// Open a connection, or return the driver error that prevented it
    fn connect(&self) -> rusqlite::Result<Connection>;

    /// Human-readable target for diagnostics (never includes credentials)
    fn target(&self) -> String;
}

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub path: PathBuf,

    /// How long to wait on a locked database (default: 5000 ms)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Connector for a SQLite database file
///
/// Opens read-write without create, so a missing file is reported as a
/// connectivity failure instead of silently creating an empty database.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            path: config.path.clone(),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database, creating the file if needed
    ///
    /// Only used by provisioning; request handling goes through `connect`.
    pub fn create(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

impl Connector for SqliteConnector {
    fn connect(&self) -> rusqlite::Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}
