use crate::db::pool::DbPool;
use crate::db::queries::{delete_session_with_breaks, load_session};
use crate::errors::{AppError, AppResult};
use crate::models::work_session::WorkSession;
use crate::ui::messages::{info, warning};
use tracing::info as trace_info;

pub struct DeleteLogic;

impl DeleteLogic {
    /// Session about to be removed, for the confirmation prompt.
    pub fn preview(pool: &DbPool, session_id: i64) -> AppResult<WorkSession> {
        load_session(&pool.conn, session_id)?
            .ok_or_else(|| AppError::NotFound(format!("work session {}", session_id)))
    }

    /// Remove a session and its breaks. An open session leaves its user OFF.
    pub fn apply(pool: &mut DbPool, session_id: i64) -> AppResult<usize> {
        let session = Self::preview(pool, session_id)?;
        if session.is_open() {
            warning(format!(
                "Session #{} is still open: {} will be OFF afterwards.",
                session_id, session.user_key
            ));
        }

        let breaks = delete_session_with_breaks(&mut pool.conn, session_id)?;
        trace_info!(session = session_id, user = %session.user_key, breaks, "session deleted");
        info(format!("Removed {} break(s) with session #{}", breaks, session_id));
        Ok(breaks)
    }
}
