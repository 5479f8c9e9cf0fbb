//! # Storage Errors
//!
//! Everything a repository call can fail with.
//!
//! ```text
//!   CoreError ─────────────┐
//!   serde_json::Error ─────┼──► DbError ──► caller shows it, or re-runs
//!   sqlx::Error ───────────┤                the whole save itself
//!   MigrateError ──────────┘
//! ```
//!
//! A failed save leaves nothing behind, so re-running it is always safe.
//! Nothing in this crate retries on its own.

use stockroom_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row for this id. Also raised mid-save when a line points at a
    /// product that has been deleted.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// Begin or commit of a document save was refused.
    #[error("Could not commit: {0}")]
    TransactionFailed(String),

    /// SQLite rejected a statement.
    #[error("Statement rejected: {0}")]
    QueryFailed(String),

    /// A stored JSON body could not be written or read back.
    #[error("Stored document is malformed: {0}")]
    Serialization(String),

    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema upgrade failed: {0}")]
    MigrationFailed(String),

    /// Every connection stayed busy past the acquire timeout.
    #[error("No free database connection")]
    PoolExhausted,

    #[error("Unexpected storage failure: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Repositories use fetch_optional; reaching this means a
            // fetch_one found nothing.
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
                DbError::QueryFailed(format!("[{}] {}", code, db_err.message()))
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".into()),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Serialization(format!("column {}: {}", index, source))
            }
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Validation(err.into())
    }
}

pub type DbResult<T> = Result<T, DbError>;
