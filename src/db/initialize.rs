use crate::db::migrate::{pending_count, run_pending_migrations};
use crate::errors::AppResult;
use rusqlite::Connection;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine, then
/// switches file databases to WAL so readers never wait on the writer.
pub fn init_db(conn: &Connection) -> AppResult<Vec<&'static str>> {
    let applied = run_pending_migrations(conn)?;

    // returns "memory" for in-memory databases, which is fine
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;

    Ok(applied)
}

/// Apply the schema only when something is missing; a no-op on a database
/// that is already up to date.
pub fn ensure_schema(conn: &Connection) -> AppResult<()> {
    if pending_count(conn)? > 0 {
        init_db(conn)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(pending_count(&conn).unwrap(), 0);
        assert!(init_db(&conn).unwrap().is_empty());
    }
}
