//! Infrastructure error types shared by the services
//!
//! Services wrap these into their own error enums; nothing here is meant to
//! reach an HTTP client verbatim.

use redis::RedisError;
use sqlx::Error as SqlxError;
use thiserror::Error;

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
}

/// Custom error type for cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Could not open a connection to the cache server
    #[error("Cache connection error: {0}")]
    Connection(#[source] RedisError),

    /// A cache command failed
    #[error("Cache command error: {0}")]
    Command(#[source] RedisError),

    /// A cached value could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Type alias for Result with CacheError
pub type CacheResult<T> = Result<T, CacheError>;
