//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.
//!
//! Business denials are NOT errors: they travel as `ActionOutcome`.
//! Everything in here is either a malformed request, an infrastructure
//! failure or a broken ledger invariant.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    // ---------------------------
    // Ledger errors
    // ---------------------------
    #[error("Ledger consistency fault: {0}")]
    Consistency(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Lost a race against another writer: an open-row guard fired or the
    /// write lock could not be taken in time. Worth re-running the unit.
    pub fn is_conflict(&self) -> bool {
        match self {
            AppError::Db(e) => {
                crate::db::queries::is_unique_violation(e) || crate::db::queries::is_busy(e)
            }
            _ => false,
        }
    }
}
