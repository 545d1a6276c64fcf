// src/database/connection.rs

use super::error::DbResult;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

pub struct DbConnection;

impl DbConnection {
    /// Opens an existing database file for browsing. A missing file is an
    /// error rather than a new empty database.
    /// PRAGMA settings are connection-specific, so they are applied on every open.
    pub fn open_existing(path: &Path, enforce_foreign_keys: bool) -> DbResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        Self::configure(&conn, enforce_foreign_keys)?;
        tracing::debug!(
            "Opened database {:?} (foreign_keys={})",
            path.file_name(),
            enforce_foreign_keys
        );
        Ok(conn)
    }

    /// Opens a private in-memory database (tests and scratch sessions).
    pub fn open_in_memory() -> DbResult<Connection> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn, true)?;
        tracing::debug!("Opened in-memory database");
        Ok(conn)
    }

    fn configure(conn: &Connection, enforce_foreign_keys: bool) -> DbResult<()> {
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys={};
             PRAGMA busy_timeout=5000;",
            if enforce_foreign_keys { "ON" } else { "OFF" }
        ))?;
        Ok(())
    }
}
