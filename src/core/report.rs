//! Read-only aggregation over sessions and breaks (what dashboards show).

use crate::db::queries::{load_breaks_for_session, load_sessions};
use crate::errors::{AppError, AppResult};
use crate::models::break_period::Break;
use crate::models::work_session::WorkSession;
use crate::utils::time::minutes_between;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session: WorkSession,
    pub breaks: Vec<Break>,
    pub break_minutes: i64,
    /// (end - start) - closed breaks, within `[0, end - start]`; 0 while open.
    pub worked_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub sessions: Vec<SessionReport>,
    pub total_minutes: i64,
}

pub fn build_session_report(session: WorkSession, breaks: Vec<Break>) -> SessionReport {
    let break_minutes: i64 = breaks.iter().map(Break::minutes).sum();
    let worked_minutes = match session.end {
        Some(end) => {
            let span = minutes_between(&session.start, &end).max(0);
            (span - break_minutes).clamp(0, span)
        }
        None => 0,
    };

    SessionReport {
        session,
        breaks,
        break_minutes,
        worked_minutes,
    }
}

/// `[first instant of month, first instant of next month)` in UTC.
pub fn month_bounds(month: &str) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidMonth(month.to_string()))?;
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let next = NaiveDate::from_ymd_opt(y, m, 1)
        .ok_or_else(|| AppError::InvalidMonth(month.to_string()))?;

    let midnight = |d: NaiveDate| {
        d.and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt))
            .ok_or_else(|| AppError::InvalidMonth(month.to_string()))
    };
    Ok((midnight(first)?, midnight(next)?))
}

fn month_range(month: Option<&str>) -> AppResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    month.map(month_bounds).transpose()
}

fn collect(
    conn: &Connection,
    user_key: Option<&str>,
    month: Option<&str>,
) -> AppResult<Vec<SessionReport>> {
    let range = month_range(month)?;
    let (from, to) = match &range {
        Some((f, t)) => (Some(f), Some(t)),
        None => (None, None),
    };

    let mut out = Vec::new();
    for session in load_sessions(conn, user_key, from, to)? {
        let breaks = load_breaks_for_session(conn, session.id)?;
        out.push(build_session_report(session, breaks));
    }
    Ok(out)
}

/// One user's sessions with their breaks, oldest first.
pub fn sessions_for_user(
    conn: &Connection,
    user_key: &str,
    month: Option<&str>,
) -> AppResult<Vec<SessionReport>> {
    collect(conn, Some(user_key), month)
}

/// Every user's sessions, oldest first.
pub fn sessions_in_month(conn: &Connection, month: Option<&str>) -> AppResult<Vec<SessionReport>> {
    collect(conn, None, month)
}

/// Group session reports by the UTC date they started on.
pub fn group_by_day(reports: Vec<SessionReport>) -> Vec<DayReport> {
    let mut days: Vec<DayReport> = Vec::new();

    for report in reports {
        let date = report.session.start.date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => {
                day.total_minutes += report.worked_minutes;
                day.sessions.push(report);
            }
            _ => days.push(DayReport {
                date,
                total_minutes: report.worked_minutes,
                sessions: vec![report],
            }),
        }
    }

    days
}

pub fn load_report(
    conn: &Connection,
    user_key: Option<&str>,
    month: Option<&str>,
) -> AppResult<Vec<DayReport>> {
    Ok(group_by_day(collect(conn, user_key, month)?))
}
