//! Atomic action executor.
//!
//! Status derivation, validation and the row mutations run inside one
//! `BEGIN IMMEDIATE` transaction, so no other writer can change the user's
//! open rows between the check and the act. The partial unique indexes on
//! open sessions/breaks back this up: a second open row can never be
//! committed, it surfaces as a conflict and the whole unit is re-run.

use crate::core::status::derive_status;
use crate::core::transition::{Transition, validate};
use crate::db::queries::{
    NewActionRecord, close_break, close_session, find_open_break, find_open_session,
    insert_action_record, insert_break, insert_session,
};
use crate::errors::{AppError, AppResult};
use crate::models::action::Action;
use crate::models::outcome::ActionOutcome;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, error, warn};

pub const CONFLICT_MESSAGE: &str =
    "The ledger was busy and the action could not be recorded. Please check your status and try again.";

/// One inbound request, as delivered by an event source.
#[derive(Debug, Clone, Copy)]
pub struct ActionRequest<'a> {
    pub user_key: &'a str,
    pub action: Action,
    pub channel_key: Option<&'a str>,
    pub annotation: Option<&'a str>,
    pub source: &'a str,
}

impl<'a> ActionRequest<'a> {
    pub fn new(user_key: &'a str, action: Action) -> Self {
        Self {
            user_key,
            action,
            channel_key: None,
            annotation: None,
            source: "cli",
        }
    }

    pub fn channel(mut self, channel_key: Option<&'a str>) -> Self {
        self.channel_key = channel_key.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn annotation(mut self, annotation: Option<&'a str>) -> Self {
        self.annotation = annotation;
        self
    }

    pub fn source(mut self, source: &'a str) -> Self {
        self.source = source;
        self
    }

    /// Text stored in the action log: the annotation, or the action name.
    pub fn raw_message(&self) -> &str {
        match self.annotation {
            Some(a) if !a.trim().is_empty() => a,
            _ => self.action.to_db_str(),
        }
    }
}

/// Run the derive-validate-mutate unit, re-running it on conflict up to
/// `max_retries` times. `now` is captured once by the caller and reused by
/// every attempt.
pub fn execute(
    conn: &mut Connection,
    req: &ActionRequest,
    now: DateTime<Utc>,
    max_retries: u32,
) -> AppResult<ActionOutcome> {
    with_retries(conn, req, max_retries, |conn| run_unit(conn, req, &now))
}

/// Conflicts re-run `unit`; once `max_retries` is spent the caller gets a
/// denial carrying a freshly read status.
fn with_retries<F>(
    conn: &mut Connection,
    req: &ActionRequest,
    max_retries: u32,
    mut unit: F,
) -> AppResult<ActionOutcome>
where
    F: FnMut(&mut Connection) -> AppResult<ActionOutcome>,
{
    let mut attempt: u32 = 0;

    loop {
        match unit(conn) {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.is_conflict() && attempt < max_retries => {
                attempt += 1;
                debug!(
                    user = req.user_key,
                    action = %req.action,
                    attempt,
                    error = %e,
                    "conflict, retrying unit"
                );
            }
            Err(e) if e.is_conflict() => {
                warn!(
                    user = req.user_key,
                    action = %req.action,
                    attempts = attempt + 1,
                    error = %e,
                    "conflict persisted, reporting denial"
                );
                let status = derive_status(conn, req.user_key)?;
                return Ok(ActionOutcome::denied(status, CONFLICT_MESSAGE));
            }
            Err(e) => return Err(e),
        }
    }
}

fn run_unit(
    conn: &mut Connection,
    req: &ActionRequest,
    now: &DateTime<Utc>,
) -> AppResult<ActionOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let status = derive_status(&tx, req.user_key)?;
    match validate(status, req.action) {
        // dropping `tx` rolls back; nothing was written
        Transition::Denied(denial) => Ok(ActionOutcome::denied(status, denial.message)),
        Transition::Allowed { next } => {
            apply_mutation(&tx, req, now)?;
            tx.commit()?;
            Ok(ActionOutcome::accepted(next))
        }
    }
}

fn consistency_fault(req: &ActionRequest, what: &str) -> AppError {
    error!(
        user = req.user_key,
        action = %req.action,
        "ledger consistency fault: {}",
        what
    );
    AppError::Consistency(format!(
        "{} for user {} while applying {}",
        what, req.user_key, req.action
    ))
}

/// Row mutations of one accepted action plus its action-log row.
/// Must run inside the caller's transaction; it does not validate status.
pub fn apply_mutation(conn: &Connection, req: &ActionRequest, now: &DateTime<Utc>) -> AppResult<()> {
    match req.action {
        Action::StartWork => {
            insert_session(conn, req.user_key, req.channel_key, now)?;
        }
        Action::EndWork => {
            let session = find_open_session(conn, req.user_key)?
                .ok_or_else(|| consistency_fault(req, "no open work session"))?;

            // an ended session never keeps an open break
            if let Some(open_break) = find_open_break(conn, session.id)? {
                close_break(conn, open_break.id, now)?;
            }

            if close_session(conn, session.id, now)? != 1 {
                return Err(consistency_fault(req, "work session was already closed"));
            }
        }
        Action::StartBreak => {
            let session = find_open_session(conn, req.user_key)?
                .ok_or_else(|| consistency_fault(req, "no open work session"))?;
            insert_break(conn, session.id, now)?;
        }
        Action::EndBreak => {
            let session = find_open_session(conn, req.user_key)?
                .ok_or_else(|| consistency_fault(req, "no open work session"))?;
            let open_break = find_open_break(conn, session.id)?
                .ok_or_else(|| consistency_fault(req, "no open break"))?;

            if close_break(conn, open_break.id, now)? != 1 {
                return Err(consistency_fault(req, "break was already closed"));
            }
        }
    }

    insert_action_record(
        conn,
        &NewActionRecord {
            user_key: req.user_key,
            channel_key: req.channel_key,
            action: req.action,
            timestamp: now,
            raw_message: req.raw_message(),
            source: req.source,
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::queries::{load_action_records, load_breaks_for_session, load_sessions};
    use crate::models::status::Status;
    use crate::utils::time::now;
    use chrono::Duration;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        init_db(&c).unwrap();
        c
    }

    fn act(c: &mut Connection, user: &str, action: Action, at: DateTime<Utc>) -> ActionOutcome {
        execute(c, &ActionRequest::new(user, action), at, 2).unwrap()
    }

    #[test]
    fn start_work_opens_a_session_and_logs_once() {
        let mut c = conn();
        let t = now();
        let req = ActionRequest::new("U1", Action::StartWork)
            .channel(Some("C1"))
            .annotation(Some("/kintai start"))
            .source("command");
        let out = execute(&mut c, &req, t, 2).unwrap();
        assert_eq!(out, ActionOutcome::accepted(Status::Working));

        let open = find_open_session(&c, "U1").unwrap().unwrap();
        assert_eq!(open.start, t);
        assert_eq!(open.channel_key.as_deref(), Some("C1"));

        let log = load_action_records(&c, Some("U1"), 10).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].timestamp, t);
        assert_eq!(log[0].raw_message, "/kintai start");
        assert_eq!(log[0].source, "command");
        assert_eq!(log[0].source_ref, t.timestamp_millis().to_string());
    }

    #[test]
    fn denial_leaves_ledger_untouched() {
        let mut c = conn();
        let out = act(&mut c, "U1", Action::EndBreak, now());
        assert!(!out.allowed);
        assert_eq!(out.status, Status::Off);

        let sessions: i64 = c
            .query_row("SELECT COUNT(*) FROM work_sessions", [], |r| r.get(0))
            .unwrap();
        let records: i64 = c
            .query_row("SELECT COUNT(*) FROM attendance_records", [], |r| r.get(0))
            .unwrap();
        assert_eq!((sessions, records), (0, 0));
    }

    #[test]
    fn full_day_cycle() {
        let mut c = conn();
        let t0 = now();
        assert!(act(&mut c, "U1", Action::StartWork, t0).allowed);
        assert!(act(&mut c, "U1", Action::StartBreak, t0 + Duration::hours(3)).allowed);
        assert!(act(&mut c, "U1", Action::EndBreak, t0 + Duration::hours(4)).allowed);
        let out = act(&mut c, "U1", Action::EndWork, t0 + Duration::hours(9));
        assert_eq!(out, ActionOutcome::accepted(Status::Off));

        let sessions = load_sessions(&c, Some("U1"), None, None).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].end, Some(t0 + Duration::hours(9)));

        let breaks = load_breaks_for_session(&c, sessions[0].id).unwrap();
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].minutes(), 60);
        assert_eq!(load_action_records(&c, None, 10).unwrap().len(), 4);
    }

    #[test]
    fn end_work_closes_a_dangling_break_with_the_same_instant() {
        let mut c = conn();
        let t0 = now();
        assert!(act(&mut c, "U1", Action::StartWork, t0).allowed);

        // a break opened outside the validated path, e.g. by correction tooling
        let sid = find_open_session(&c, "U1").unwrap().unwrap().id;
        insert_break(&c, sid, &(t0 + Duration::minutes(30))).unwrap();
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::OnBreak);

        let end = t0 + Duration::hours(2);
        let tx = c.transaction().unwrap();
        apply_mutation(&tx, &ActionRequest::new("U1", Action::EndWork), &end).unwrap();
        tx.commit().unwrap();

        assert_eq!(derive_status(&c, "U1").unwrap(), Status::Off);
        let session = &load_sessions(&c, Some("U1"), None, None).unwrap()[0];
        let breaks = load_breaks_for_session(&c, sid).unwrap();
        assert_eq!(session.end, Some(end));
        assert_eq!(breaks[0].end, session.end);
    }

    #[test]
    fn missing_session_is_a_consistency_fault() {
        let c = conn();
        let err = apply_mutation(&c, &ActionRequest::new("U1", Action::StartBreak), &now())
            .unwrap_err();
        assert!(matches!(err, AppError::Consistency(_)));
    }

    fn busy() -> AppError {
        AppError::Db(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    #[test]
    fn conflicts_are_retried_then_denied() {
        let mut c = conn();
        let req = ActionRequest::new("U1", Action::StartWork);
        let mut calls = 0;

        let out = with_retries(&mut c, &req, 3, |_| {
            calls += 1;
            Err(busy())
        })
        .unwrap();

        assert_eq!(calls, 4);
        assert_eq!(out, ActionOutcome::denied(Status::Off, CONFLICT_MESSAGE));
    }

    #[test]
    fn conflict_followed_by_success_is_accepted() {
        let mut c = conn();
        let req = ActionRequest::new("U1", Action::StartWork);
        let mut calls = 0;

        let out = with_retries(&mut c, &req, 2, |_| {
            calls += 1;
            if calls == 1 {
                Err(busy())
            } else {
                Ok(ActionOutcome::accepted(Status::Working))
            }
        })
        .unwrap();

        assert_eq!(calls, 2);
        assert!(out.allowed);
    }

    #[test]
    fn non_conflict_errors_are_not_retried() {
        let mut c = conn();
        let req = ActionRequest::new("U1", Action::EndWork);
        let mut calls = 0;

        let err = with_retries(&mut c, &req, 5, |_| {
            calls += 1;
            Err(AppError::Consistency("boom".into()))
        })
        .unwrap_err();

        assert_eq!(calls, 1);
        assert!(matches!(err, AppError::Consistency(_)));
    }

    #[test]
    fn blank_channel_is_treated_as_absent() {
        let req = ActionRequest::new("U1", Action::StartWork).channel(Some("  "));
        assert_eq!(req.channel_key, None);
        assert_eq!(req.raw_message(), "START_WORK");
    }
}
