use crate::errors::{AppError, AppResult};
use crate::models::action::Action;
use crate::models::action_record::ActionRecord;
use crate::models::break_period::Break;
use crate::models::work_session::WorkSession;
use crate::utils::time::{format_ts, ts_from_sql};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result, Row, params};

const SESSION_COLUMNS: &str =
    "s.id, s.user_key, s.channel_key, s.start_time, s.end_time, s.created_at, s.updated_at";

/// Unique-index violation: the partial "one open row" guards fired.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Another connection holds the write lock past the busy timeout.
pub fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::DatabaseBusy || e.code == ErrorCode::DatabaseLocked
    )
}

fn opt_ts(idx: usize, value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.map(|s| ts_from_sql(idx, &s)).transpose()
}

pub fn map_session(row: &Row) -> Result<WorkSession> {
    let start: String = row.get("start_time")?;
    let created: String = row.get("created_at")?;
    let updated: String = row.get("updated_at")?;

    Ok(WorkSession {
        id: row.get("id")?,
        user_key: row.get("user_key")?,
        channel_key: row.get("channel_key")?,
        start: ts_from_sql(3, &start)?,
        end: opt_ts(4, row.get("end_time")?)?,
        created_at: ts_from_sql(5, &created)?,
        updated_at: ts_from_sql(6, &updated)?,
    })
}

pub fn map_break(row: &Row) -> Result<Break> {
    let start: String = row.get("start_time")?;
    let created: String = row.get("created_at")?;
    let updated: String = row.get("updated_at")?;

    Ok(Break {
        id: row.get("id")?,
        work_session_id: row.get("work_session_id")?,
        start: ts_from_sql(2, &start)?,
        end: opt_ts(3, row.get("end_time")?)?,
        created_at: ts_from_sql(4, &created)?,
        updated_at: ts_from_sql(5, &updated)?,
    })
}

pub fn map_record(row: &Row) -> Result<ActionRecord> {
    let action_str: String = row.get("action")?;
    let action = Action::from_db_str(&action_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidAction(action_str.clone())),
        )
    })?;
    let ts: String = row.get("timestamp")?;

    Ok(ActionRecord {
        id: row.get("id")?,
        user_key: row.get("user_key")?,
        channel_key: row.get("channel_key")?,
        action,
        timestamp: ts_from_sql(4, &ts)?,
        source_ref: row.get("source_ref")?,
        raw_message: row.get("raw_message")?,
        source: row.get("source")?,
    })
}

/// The user's open session and, if any, that session's open break, read by a
/// single statement.
pub fn load_open_position(
    conn: &Connection,
    user_key: &str,
) -> AppResult<Option<(WorkSession, Option<Break>)>> {
    let sql = format!(
        "SELECT {SESSION_COLUMNS},
                b.id AS break_id, b.start_time AS break_start, b.end_time AS break_end,
                b.created_at AS break_created_at, b.updated_at AS break_updated_at
         FROM work_sessions s
         LEFT JOIN breaks b
                ON b.work_session_id = s.id AND b.end_time IS NULL
         WHERE s.user_key = ?1 AND s.end_time IS NULL
         ORDER BY s.start_time DESC, b.start_time DESC
         LIMIT 1"
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    let found = stmt
        .query_row([user_key], |row| {
            let session = map_session(row)?;
            let break_id: Option<i64> = row.get("break_id")?;
            let open_break = match break_id {
                Some(id) => {
                    let start: String = row.get("break_start")?;
                    let created: String = row.get("break_created_at")?;
                    let updated: String = row.get("break_updated_at")?;
                    Some(Break {
                        id,
                        work_session_id: session.id,
                        start: ts_from_sql(8, &start)?,
                        end: opt_ts(9, row.get("break_end")?)?,
                        created_at: ts_from_sql(10, &created)?,
                        updated_at: ts_from_sql(11, &updated)?,
                    })
                }
                None => None,
            };
            Ok((session, open_break))
        })
        .optional()?;

    Ok(found)
}

pub fn find_open_session(conn: &Connection, user_key: &str) -> AppResult<Option<WorkSession>> {
    let sql = format!(
        "SELECT {SESSION_COLUMNS} FROM work_sessions s
         WHERE s.user_key = ?1 AND s.end_time IS NULL
         ORDER BY s.start_time DESC
         LIMIT 1"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.query_row([user_key], map_session).optional()?)
}

pub fn find_open_break(conn: &Connection, session_id: i64) -> AppResult<Option<Break>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, work_session_id, start_time, end_time, created_at, updated_at
         FROM breaks
         WHERE work_session_id = ?1 AND end_time IS NULL
         ORDER BY start_time DESC
         LIMIT 1",
    )?;
    Ok(stmt.query_row([session_id], map_break).optional()?)
}

pub fn insert_session(
    conn: &Connection,
    user_key: &str,
    channel_key: Option<&str>,
    now: &DateTime<Utc>,
) -> Result<i64> {
    let ts = format_ts(now);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO work_sessions (user_key, channel_key, start_time, end_time, created_at, updated_at)
         VALUES (?1, ?2, ?3, NULL, ?3, ?3)",
    )?;
    stmt.execute(params![user_key, channel_key, ts])?;
    Ok(conn.last_insert_rowid())
}

/// Conditional close: only touches the row if it is still open.
/// Returns the number of rows changed (0 or 1).
pub fn close_session(conn: &Connection, session_id: i64, now: &DateTime<Utc>) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "UPDATE work_sessions SET end_time = ?1, updated_at = ?1
         WHERE id = ?2 AND end_time IS NULL",
    )?;
    stmt.execute(params![format_ts(now), session_id])
}

pub fn insert_break(conn: &Connection, session_id: i64, now: &DateTime<Utc>) -> Result<i64> {
    let ts = format_ts(now);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO breaks (work_session_id, start_time, end_time, created_at, updated_at)
         VALUES (?1, ?2, NULL, ?2, ?2)",
    )?;
    stmt.execute(params![session_id, ts])?;
    Ok(conn.last_insert_rowid())
}

pub fn close_break(conn: &Connection, break_id: i64, now: &DateTime<Utc>) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "UPDATE breaks SET end_time = ?1, updated_at = ?1
         WHERE id = ?2 AND end_time IS NULL",
    )?;
    stmt.execute(params![format_ts(now), break_id])
}

pub struct NewActionRecord<'a> {
    pub user_key: &'a str,
    pub channel_key: Option<&'a str>,
    pub action: Action,
    pub timestamp: &'a DateTime<Utc>,
    pub raw_message: &'a str,
    pub source: &'a str,
}

pub fn insert_action_record(conn: &Connection, rec: &NewActionRecord) -> Result<i64> {
    let ts = format_ts(rec.timestamp);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO attendance_records
            (user_key, channel_key, action, timestamp, source_ref, raw_message, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?4)",
    )?;
    stmt.execute(params![
        rec.user_key,
        rec.channel_key,
        rec.action.to_db_str(),
        ts,
        rec.timestamp.timestamp_millis().to_string(),
        rec.raw_message,
        rec.source,
    ])?;
    Ok(conn.last_insert_rowid())
}

pub fn load_action_records(
    conn: &Connection,
    user_key: Option<&str>,
    limit: usize,
) -> AppResult<Vec<ActionRecord>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_key, channel_key, action, timestamp, source_ref, raw_message, source
         FROM attendance_records
         WHERE ?1 IS NULL OR user_key = ?1
         ORDER BY timestamp DESC, id DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_key, limit as i64], map_record)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_session(conn: &Connection, session_id: i64) -> AppResult<Option<WorkSession>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM work_sessions s WHERE s.id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.query_row([session_id], map_session).optional()?)
}

/// Sessions whose start falls in `[from, to)`, optionally for one user,
/// oldest first.
pub fn load_sessions(
    conn: &Connection,
    user_key: Option<&str>,
    from: Option<&DateTime<Utc>>,
    to: Option<&DateTime<Utc>>,
) -> AppResult<Vec<WorkSession>> {
    let sql = format!(
        "SELECT {SESSION_COLUMNS} FROM work_sessions s
         WHERE (?1 IS NULL OR s.user_key = ?1)
           AND (?2 IS NULL OR s.start_time >= ?2)
           AND (?3 IS NULL OR s.start_time < ?3)
         ORDER BY s.start_time ASC, s.id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(
        params![user_key, from.map(format_ts), to.map(format_ts)],
        map_session,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_breaks_for_session(conn: &Connection, session_id: i64) -> AppResult<Vec<Break>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, work_session_id, start_time, end_time, created_at, updated_at
         FROM breaks
         WHERE work_session_id = ?1
         ORDER BY start_time ASC, id ASC",
    )?;
    let rows = stmt.query_map([session_id], map_break)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Operator deletion: a session together with its breaks, all or nothing.
/// Returns the number of breaks removed.
pub fn delete_session_with_breaks(conn: &mut Connection, session_id: i64) -> AppResult<usize> {
    let tx = conn.transaction()?;

    let exists = tx
        .query_row(
            "SELECT 1 FROM work_sessions WHERE id = ?1",
            [session_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !exists {
        return Err(AppError::NotFound(format!("work session {}", session_id)));
    }

    let breaks = tx.execute("DELETE FROM breaks WHERE work_session_id = ?1", [session_id])?;
    tx.execute("DELETE FROM work_sessions WHERE id = ?1", [session_id])?;
    crate::db::log::ttlog(
        &tx,
        "del",
        &format!("session {}", session_id),
        &format!("Deleted work session {} and {} break(s)", session_id, breaks),
    )?;
    tx.commit()?;

    Ok(breaks)
}

/// Number of open rows that violate the "at most one" invariants.
/// Always zero on a healthy ledger; used by `db --check`.
pub fn count_invariant_violations(conn: &Connection) -> AppResult<(i64, i64)> {
    let sessions: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (
            SELECT user_key FROM work_sessions WHERE end_time IS NULL
            GROUP BY user_key HAVING COUNT(*) > 1
         )",
        [],
        |row| row.get(0),
    )?;
    let breaks: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (
            SELECT work_session_id FROM breaks WHERE end_time IS NULL
            GROUP BY work_session_id HAVING COUNT(*) > 1
         )",
        [],
        |row| row.get(0),
    )?;
    Ok((sessions, breaks))
}
