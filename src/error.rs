//! Errors surfaced by directory operations.
//!
//! The storage constraints are the only source of truth for correctness, so
//! these variants mirror what PostgreSQL reports: a duplicate email, a phone
//! pointing at a missing client, or anything else the driver returns.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    /// A unique constraint rejected the write (duplicate email).
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key rejected the write (phone for an unknown client).
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Connectivity, syntax, truncation and every other driver failure.
    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

impl DirectoryError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) => Some((
                db_err.kind(),
                db_err.constraint().unwrap_or("unknown").to_string(),
            )),
            _ => None,
        };

        match kind {
            Some((ErrorKind::UniqueViolation, constraint)) => {
                tracing::warn!(%constraint, "write rejected by unique constraint");
                Self::UniqueViolation { constraint }
            }
            Some((ErrorKind::ForeignKeyViolation, constraint)) => {
                tracing::warn!(%constraint, "write rejected by foreign key");
                Self::ForeignKeyViolation { constraint }
            }
            _ => Self::Storage(err),
        }
    }
}
