//! Error types for the mint service

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Core commitment or authorization failure, passed through unchanged
    #[error(transparent)]
    Core(#[from] dropmint_core::Error),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] dropmint_storage_sqlite::Error),

    /// External collaborator failure (chain reader, blocking task)
    #[error("Provider error: {0}")]
    Provider(String),
}

impl Error {
    /// Check if error was caused by caller input (vs internal failure)
    pub fn is_user_error(&self) -> bool {
        match self {
            Error::Core(e) => e.is_user_error(),
            Error::Storage(dropmint_storage_sqlite::Error::Validation(e)) => e.is_user_error(),
            _ => false,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::Core(e) => e.user_message(),
            Error::Storage(_) | Error::Provider(_) => {
                "The service is temporarily unavailable. Please try again.".to_string()
            }
        }
    }
}
