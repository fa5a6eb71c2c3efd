use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    #[error("Invalid authorization URL: {0}")]
    AuthUrl(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Fetch user info error: {0}")]
    FetchUserInfo(String),

    #[error("Fetch emails error: {0}")]
    FetchEmails(String),

    #[error("No primary verified email")]
    NoVerifiedPrimaryEmail,

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
