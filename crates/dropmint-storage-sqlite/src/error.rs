//! Error types

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Stored row could not be turned back into a domain value
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(#[from] dropmint_core::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
