//! Error types for the storage layer.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Unique email constraint violated.
    #[error("email already exists: {0}")]
    DuplicateEmail(String),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Note not found (covers foreign ownership as well).
    #[error("note not found: {0}")]
    NoteNotFound(String),

    /// A row held an identifier that does not parse as a RecordId.
    #[error("corrupt identifier in row: {0}")]
    CorruptId(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

impl StoreError {
    /// Map a sqlx error, converting unique violations on the email index
    /// into `DuplicateEmail`.
    pub fn from_sqlx(err: sqlx::Error, email: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Self::DuplicateEmail(email.to_string());
            }
        }
        Self::Database(err)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_sqlx_error_is_database() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound, "a@b.com");
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_display_messages() {
        let err = StoreError::DuplicateEmail("a@b.com".into());
        assert_eq!(err.to_string(), "email already exists: a@b.com");

        let err = StoreError::UserNotFound("0".repeat(24));
        assert!(err.to_string().starts_with("user not found"));
    }
}
