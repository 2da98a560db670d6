//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every persistence
//! backend of the application.

use sqlx::Error as SqlxError;
use thiserror::Error;
use uuid::Uuid;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A row that was required to exist does not
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// A uniqueness constraint would be violated
    #[error("{0} already exists")]
    Conflict(String),

    /// A value would leave the range the schema allows
    #[error("{0}")]
    OutOfRange(String),

    /// Stored data could not be mapped back into the domain model
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl DatabaseError {
    /// Map a query error, turning unique violations into [`DatabaseError::Conflict`]
    pub fn from_query(err: SqlxError, what: &str) -> Self {
        match &err {
            SqlxError::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(what.to_string())
            }
            _ => DatabaseError::Query(err),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::Migration(err.to_string())
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
