use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Missing, unknown, expired or malformed session token.
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session store timed out")]
    Timeout,

    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
