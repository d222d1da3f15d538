use crate::config::Config;
use crate::db::log;
use crate::errors::AppResult;

use crate::cli::parser::Cli;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::ui::messages::{success, warning};
use std::time::Duration;

/// Handle the `init` command
///
/// Creates the config directory and file, the SQLite database, applies the
/// schema and switches the journal to WAL.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = cfg.database.clone();

    println!("⚙️  Initializing rAttendance…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &db_path);

    let pool = DbPool::with_timeout(&db_path, Duration::from_millis(cfg.busy_timeout_ms))?;
    let applied = init_db(&pool.conn)?;

    for version in &applied {
        println!("   ↳ migration {} applied", version);
    }
    success(format!("Database initialized at {}", &db_path));

    // internal log, not blocking
    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "database",
        &format!("Database initialized at {}", &db_path),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    println!("🎉 rAttendance initialization completed!");
    Ok(())
}
