//! The attendance ledger as seen by callers: one connection, an identity
//! directory and the executor's retry budget.

use crate::config::Config;
use crate::core::directory::{Directory, NoDirectory, StaticDirectory, enrich};
use crate::core::executor::{ActionRequest, execute};
use crate::core::status::derive_status;
use crate::db::initialize::ensure_schema;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::outcome::ActionOutcome;
use crate::models::status::Status;
use crate::utils::time;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::time::Duration;

pub const DEFAULT_CONFLICT_RETRIES: u32 = 2;

pub struct Ledger {
    pool: DbPool,
    directory: Box<dyn Directory>,
    max_retries: u32,
}

impl Ledger {
    /// Open the configured database, creating the schema on first use.
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let pool = DbPool::with_timeout(
            &cfg.database,
            Duration::from_millis(cfg.busy_timeout_ms),
        )?;
        let mut ledger = Self::from_pool(pool)?;
        ledger.directory = Box::new(StaticDirectory::from_config(&cfg.directory));
        ledger.max_retries = cfg.conflict_retries();
        Ok(ledger)
    }

    pub fn from_pool(pool: DbPool) -> AppResult<Self> {
        ensure_schema(&pool.conn)?;
        Ok(Self {
            pool,
            directory: Box::new(NoDirectory),
            max_retries: DEFAULT_CONFLICT_RETRIES,
        })
    }

    pub fn with_directory(mut self, directory: impl Directory + 'static) -> Self {
        self.directory = Box::new(directory);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    pub fn status(&self, user_key: &str) -> AppResult<Status> {
        derive_status(&self.pool.conn, user_key)
    }

    pub fn execute(&mut self, req: &ActionRequest) -> AppResult<ActionOutcome> {
        self.execute_at(req, time::now())
    }

    /// Same as [`Ledger::execute`] with an explicit instant.
    pub fn execute_at(
        &mut self,
        req: &ActionRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ActionOutcome> {
        let outcome = execute(&mut self.pool.conn, req, now, self.max_retries)?;

        if outcome.allowed {
            enrich(
                &self.pool.conn,
                self.directory.as_ref(),
                req.user_key,
                req.channel_key,
                &now,
            );
        }

        Ok(outcome)
    }
}
