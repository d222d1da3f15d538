//! SQLite connection wrapper.
//!
//! One `DbPool` per caller: threads and processes never share a connection,
//! they coordinate through SQLite's own locking.

use rusqlite::{Connection, Result};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        Self::with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn with_timeout(path: &str, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(conn, busy_timeout)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn, DEFAULT_BUSY_TIMEOUT)
    }

    fn configure(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }
}
