//! Status derivation: OFF / WORKING / ON_BREAK from the open rows only.

use crate::db::queries::load_open_position;
use crate::errors::AppResult;
use crate::models::break_period::Break;
use crate::models::status::Status;
use crate::models::work_session::WorkSession;
use rusqlite::Connection;
use tracing::debug;

/// Derive the user's status with one statement. Pass a transaction to make
/// the read part of a unit of work.
pub fn derive_status(conn: &Connection, user_key: &str) -> AppResult<Status> {
    let position = load_open_position(conn, user_key)?;
    let status = status_of(position.as_ref());
    debug!(user = user_key, %status, "status derived");
    Ok(status)
}

pub fn status_of(position: Option<&(WorkSession, Option<Break>)>) -> Status {
    match position {
        None => Status::Off,
        Some((_, Some(_))) => Status::OnBreak,
        Some((_, None)) => Status::Working,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::queries::{close_break, close_session, insert_break, insert_session};
    use crate::utils::time::now;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        init_db(&c).unwrap();
        c
    }

    #[test]
    fn follows_open_rows() {
        let c = conn();
        let t = now();
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::Off);

        let sid = insert_session(&c, "U1", Some("C1"), &t).unwrap();
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::Working);

        let bid = insert_break(&c, sid, &t).unwrap();
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::OnBreak);

        close_break(&c, bid, &t).unwrap();
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::Working);

        close_session(&c, sid, &t).unwrap();
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::Off);
    }

    #[test]
    fn users_do_not_leak_into_each_other() {
        let c = conn();
        let sid = insert_session(&c, "U1", None, &now()).unwrap();
        insert_break(&c, sid, &now()).unwrap();
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::OnBreak);
        assert_eq!(derive_status(&c, "U2").unwrap(), Status::Off);
    }

    #[test]
    fn closed_breaks_of_the_open_session_are_ignored() {
        let c = conn();
        let t = now();
        let sid = insert_session(&c, "U1", None, &t).unwrap();
        for _ in 0..3 {
            let b = insert_break(&c, sid, &t).unwrap();
            close_break(&c, b, &t).unwrap();
        }
        assert_eq!(derive_status(&c, "U1").unwrap(), Status::Working);
    }
}
