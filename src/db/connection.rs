use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

use super::schema::{migrate, seed_instrument_types};

/// How long a writer waits for a competing writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the single SQLite connection used by every roster, inventory and
/// assignment operation. Opened at startup, handed to the operations by
/// reference, and closed when the application exits (or when dropped).
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file, enable WAL journaling so readers
    /// never block the single writer, and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create data directory")?;
            }
        }

        let conn = Connection::open(path).context("failed to open SQLite database")?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .context("failed to enable WAL journaling")?;
        info!(path = %path.display(), "opened band database");
        Self::prepare(conn)
    }

    /// Fresh private database, used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::prepare(conn)
    }

    fn prepare(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("failed to set busy timeout")?;
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("failed to enable foreign keys")?;

        let version = migrate(&mut conn).context("failed to migrate schema")?;
        seed_instrument_types(&conn).context("failed to seed instrument types")?;
        debug!(version, "schema ready");

        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, reporting any error SQLite raises while flushing.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| err)
            .context("failed to close database")
    }
}
