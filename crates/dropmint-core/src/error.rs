//! Error types for Dropmint Core
//!
//! Typed failures for encoding, tree building, authorization and policy checks.
//! Nothing in this crate retries; callers decide what to do with each kind.

use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Dropmint Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input (address, count, currency amount, wave definition)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Canonical encoding cannot represent an input
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// No unique sale wave is currently active
    #[error("No sale running: {0}")]
    NoSaleRunning(String),

    /// Signature could not be recovered or recovered to the wrong signer
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Token-gated entitlement denied the request
    #[error("Mint limit exceeded: {0}")]
    MintLimitExceeded(String),

    /// Signing key store failed to produce a signature
    #[error("Signing error: {0}")]
    Signing(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Check if error was caused by caller input (vs internal failure)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::NoSaleRunning(_)
                | Error::InvalidSignature(_)
                | Error::MintLimitExceeded(_)
        )
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::NoSaleRunning(_) => "There is no sale running for this project right now.".to_string(),
            Error::InvalidSignature(_) => {
                "The wallet signature could not be verified. Please sign again.".to_string()
            }
            Error::MintLimitExceeded(_) => {
                "You have reached the maximum number of mints for this sale.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) => ErrorCategory::Validation,
            Error::Encoding(_) | Error::Serialization(_) => ErrorCategory::Encoding,
            Error::NoSaleRunning(_) | Error::MintLimitExceeded(_) => ErrorCategory::Sale,
            Error::InvalidSignature(_) | Error::Signing(_) => ErrorCategory::Authorization,
            Error::Config(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input validation errors
    Validation,
    /// Canonical encoding errors
    Encoding,
    /// Sale state errors
    Sale,
    /// Signature and signer errors
    Authorization,
    /// Internal/system errors
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Encoding => write!(f, "Encoding"),
            ErrorCategory::Sale => write!(f, "Sale"),
            ErrorCategory::Authorization => write!(f, "Authorization"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}
