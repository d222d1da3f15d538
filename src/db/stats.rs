use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RED, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

fn count(pool: &DbPool, sql: &str) -> rusqlite::Result<i64> {
    pool.conn.query_row(sql, [], |row| row.get(0))
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    let sessions = count(pool, "SELECT COUNT(*) FROM work_sessions")?;
    let open_sessions = count(pool, "SELECT COUNT(*) FROM work_sessions WHERE end_time IS NULL")?;
    let breaks = count(pool, "SELECT COUNT(*) FROM breaks")?;
    let open_breaks = count(pool, "SELECT COUNT(*) FROM breaks WHERE end_time IS NULL")?;
    let records = count(pool, "SELECT COUNT(*) FROM attendance_records")?;
    let users = count(pool, "SELECT COUNT(*) FROM users")?;

    println!(
        "{}• Work sessions:{} {}{}{} ({} open)",
        CYAN, RESET, GREEN, sessions, RESET, open_sessions
    );
    println!(
        "{}• Breaks:{} {}{}{} ({} open)",
        CYAN, RESET, GREEN, breaks, RESET, open_breaks
    );
    println!("{}• Action records:{} {}{}{}", CYAN, RESET, GREEN, records, RESET);
    println!("{}• Known users:{} {}", CYAN, RESET, users);

    //
    // 3) DATE RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT start_time FROM work_sessions ORDER BY start_time ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT start_time FROM work_sessions ORDER BY start_time DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    println!("{}• Session range:{}", CYAN, RESET);
    println!(
        "    from: {}",
        first.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );
    println!(
        "    to:   {}",
        last.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    //
    // 4) LEDGER INVARIANTS
    //
    let (bad_sessions, bad_breaks) = crate::db::queries::count_invariant_violations(&pool.conn)?;
    if bad_sessions == 0 && bad_breaks == 0 {
        println!("{}• Open-row invariants:{} {}ok{}", CYAN, RESET, GREEN, RESET);
    } else {
        println!(
            "{}• Open-row invariants:{} {}{} user(s), {} session(s) in violation{}",
            CYAN, RESET, RED, bad_sessions, bad_breaks, RESET
        );
    }

    println!();
    Ok(())
}
