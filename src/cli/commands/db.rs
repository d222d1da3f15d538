use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::{ensure_schema, init_db};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::count_invariant_violations;
use crate::db::stats;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RED, RESET};
use std::time::Duration;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = cmd
    {
        let mut pool =
            DbPool::with_timeout(&cfg.database, Duration::from_millis(cfg.busy_timeout_ms))?;

        //
        // 1) MIGRATE
        //
        if *migrate {
            println!("{}▶ Running migrations…{}", CYAN, RESET);
            let applied = init_db(&pool.conn)?;
            if applied.is_empty() {
                println!("{}✔ Schema already up to date.{}\n", GREEN, RESET);
            } else {
                println!(
                    "{}✔ Applied {} migration(s): {}{}\n",
                    GREEN,
                    applied.len(),
                    applied.join(", "),
                    RESET
                );
            }
        } else {
            ensure_schema(&pool.conn)?;
        }

        //
        // 2) INFO
        //
        if *info {
            stats::print_db_info(&mut pool, &cfg.database)?;
        }

        //
        // 3) CHECK
        //
        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);

            let integrity: String = pool
                .conn
                .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

            if integrity == "ok" {
                println!("{}✔ Integrity check passed.{}", GREEN, RESET);
            } else {
                println!("{}✘ Integrity check failed:{} {}", RED, RESET, integrity);
            }

            let (users, sessions) = count_invariant_violations(&pool.conn)?;
            if users == 0 && sessions == 0 {
                println!("{}✔ At most one open session per user, one open break per session.{}\n", GREEN, RESET);
            } else {
                println!(
                    "{}✘ {} user(s) with several open sessions, {} session(s) with several open breaks.{}\n",
                    RED, users, sessions, RESET
                );
            }
        }

        //
        // 4) VACUUM
        //
        if *vacuum {
            println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            pool.conn.execute_batch("VACUUM;")?;
            ttlog(&pool.conn, "vacuum", "database", "VACUUM completed")?;
            println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
        }
    }

    Ok(())
}
