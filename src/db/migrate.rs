//! Schema setup. Each migration runs once and is marked in the `log` table
//! with operation `migration_applied`.

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, info};

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250901_0001_ledger_tables",
        description: "Created work_sessions, breaks and attendance_records",
        sql: r#"
        CREATE TABLE IF NOT EXISTS work_sessions (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_key     TEXT NOT NULL,
            channel_key  TEXT,
            start_time   TEXT NOT NULL,
            end_time     TEXT,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_work_sessions_user_start
            ON work_sessions(user_key, start_time);
        CREATE INDEX IF NOT EXISTS idx_work_sessions_start
            ON work_sessions(start_time);

        CREATE TABLE IF NOT EXISTS breaks (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            work_session_id  INTEGER NOT NULL
                REFERENCES work_sessions(id) ON DELETE RESTRICT,
            start_time       TEXT NOT NULL,
            end_time         TEXT,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_breaks_session_start
            ON breaks(work_session_id, start_time);

        CREATE TABLE IF NOT EXISTS attendance_records (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_key     TEXT NOT NULL,
            channel_key  TEXT,
            action       TEXT NOT NULL
                CHECK(action IN ('START_WORK','END_WORK','START_BREAK','END_BREAK')),
            timestamp    TEXT NOT NULL,
            source_ref   TEXT NOT NULL,
            raw_message  TEXT NOT NULL DEFAULT '',
            source       TEXT NOT NULL DEFAULT 'cli',
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_records_user_ts
            ON attendance_records(user_key, timestamp);
        "#,
    },
    Migration {
        version: "20250915_0002_open_row_guards",
        description: "At most one open session per user and one open break per session",
        sql: r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_work_sessions_one_open
            ON work_sessions(user_key) WHERE end_time IS NULL;
        CREATE UNIQUE INDEX IF NOT EXISTS ux_breaks_one_open
            ON breaks(work_session_id) WHERE end_time IS NULL;
        "#,
    },
    Migration {
        version: "20251002_0003_identity_cache",
        description: "Created users and channels profile cache",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            user_key      TEXT PRIMARY KEY,
            display_name  TEXT,
            real_name     TEXT,
            email         TEXT,
            team_id       TEXT NOT NULL DEFAULT 'unknown',
            is_active     INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS channels (
            channel_key   TEXT PRIMARY KEY,
            name          TEXT,
            kind          TEXT,
            is_active     INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );
        "#,
    },
];

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn is_applied(conn: &Connection, version: &str) -> rusqlite::Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Number of migrations not yet applied. Read-only.
pub fn pending_count(conn: &Connection) -> AppResult<usize> {
    let has_log: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'log'",
        [],
        |row| row.get(0),
    )?;
    if has_log == 0 {
        return Ok(MIGRATIONS.len());
    }

    let mut pending = 0;
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            pending += 1;
        }
    }
    Ok(pending)
}

/// Public entry point: run all pending migrations.
/// Returns the versions applied by this call.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        // IMMEDIATE: concurrent initializers serialize on the marker check
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        if is_applied(&tx, m.version)? {
            debug!(version = m.version, "migration already applied");
            continue;
        }

        tx.execute_batch(m.sql)
            .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;
        crate::db::log::ttlog(&tx, "migration_applied", m.version, m.description)?;
        tx.commit()?;

        info!(version = m.version, "migration applied");
        applied.push(m.version);
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(pending_count(&conn).unwrap(), MIGRATIONS.len());
        let first = run_pending_migrations(&conn).unwrap();
        assert_eq!(first.len(), MIGRATIONS.len());
        let second = run_pending_migrations(&conn).unwrap();
        assert!(second.is_empty());
        assert_eq!(pending_count(&conn).unwrap(), 0);

        let marks: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(marks, MIGRATIONS.len() as i64);
    }

    #[test]
    fn open_session_guard_rejects_second_open_row() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();

        let insert = "INSERT INTO work_sessions (user_key, start_time, created_at, updated_at)
                      VALUES ('U1', 't', 't', 't')";
        conn.execute(insert, []).unwrap();
        let err = conn.execute(insert, []).unwrap_err();
        assert!(crate::db::queries::is_unique_violation(&err));

        // a closed row does not count
        conn.execute("UPDATE work_sessions SET end_time = 't2'", [])
            .unwrap();
        conn.execute(insert, []).unwrap();
    }
}
