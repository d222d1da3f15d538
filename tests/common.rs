#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rattendance::Ledger;
use rattendance::db::initialize::init_db;
use rattendance::db::pool::DbPool;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub fn rti() -> Command {
    cargo_bin_cmd!("rattendance")
}

/// Create a unique test DB path inside the system temp dir and remove any
/// existing file (and its WAL companions)
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    for suffix in ["", "-wal", "-shm"] {
        fs::remove_file(format!("{}{}", db_path, suffix)).ok();
    }
    db_path
}

/// Initialize the DB through the CLI, like a user would
pub fn init_via_cli(db_path: &str) {
    rti()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Fresh file database with the schema applied
pub fn fresh_db(name: &str) -> String {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).expect("open db");
    init_db(&pool.conn).expect("init db");
    db_path
}

/// One ledger = one connection, as one request handler would own
pub fn open_ledger(db_path: &str) -> Ledger {
    let pool = DbPool::with_timeout(db_path, Duration::from_secs(10)).expect("open db");
    Ledger::from_pool(pool).expect("ledger")
}
