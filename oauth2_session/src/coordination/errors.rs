//! Failure kinds of the login, callback and session flows

use thiserror::Error;

use crate::oauth2::OAuth2Error;
use crate::session::SessionError;

/// Every way an auth flow can end early.
///
/// The payload is server-side detail for logs. Clients only ever see [`Self::user_message`].
#[derive(Error, Debug, Clone)]
pub enum CoordinationError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Authorization denied by provider: {0}")]
    AuthorizationDenied(String),

    #[error("Failed to start login: {0}")]
    StateIssueFailed(String),

    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("Email fetch failed: {0}")]
    EmailFetchFailed(String),

    #[error("No verified primary email")]
    NoVerifiedPrimaryEmail,

    #[error("Account lookup failed: {0}")]
    AccountLookupFailed(String),

    #[error("Account creation failed: {0}")]
    AccountCreateFailed(String),

    #[error("Session creation failed: {0}")]
    SessionCreateFailed(String),

    #[error("Session store failed: {0}")]
    SessionStoreFailed(String),

    #[error("Unauthenticated")]
    Unauthenticated,
}

impl CoordinationError {
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidState(msg) => tracing::warn!("Invalid state: {}", msg),
            Self::AuthorizationDenied(msg) => {
                tracing::warn!("Authorization denied by provider: {}", msg)
            }
            Self::NoVerifiedPrimaryEmail => {
                tracing::warn!("GitHub account has no primary verified email")
            }
            Self::Unauthenticated => tracing::debug!("Unauthenticated request"),
            other => tracing::error!("{}", other),
        }
        self
    }

    /// Generic text safe to show a browser.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "Login request could not be verified. Please sign in again.",
            Self::AuthorizationDenied(_) => "GitHub sign-in was cancelled.",
            Self::NoVerifiedPrimaryEmail => {
                "Your GitHub account needs a verified primary email address to sign in."
            }
            Self::Unauthenticated => "Not authenticated",
            Self::ExchangeFailed(_) | Self::ProfileFetchFailed(_) | Self::EmailFetchFailed(_) => {
                "Sign-in with GitHub failed. Please try again."
            }
            Self::StateIssueFailed(_)
            | Self::AccountLookupFailed(_)
            | Self::AccountCreateFailed(_)
            | Self::SessionCreateFailed(_)
            | Self::SessionStoreFailed(_) => "Internal server error",
        }
    }
}

impl From<SessionError> for CoordinationError {
    /// Session failures outside of issuing.
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unauthenticated => Self::Unauthenticated,
            other => Self::SessionStoreFailed(other.to_string()),
        }
    }
}

/// Maps a provider failure onto the flow step it happened in.
pub(super) fn from_provider(err: OAuth2Error) -> CoordinationError {
    match err {
        OAuth2Error::TokenExchange(msg) => CoordinationError::ExchangeFailed(msg),
        OAuth2Error::FetchUserInfo(msg) => CoordinationError::ProfileFetchFailed(msg),
        OAuth2Error::FetchEmails(msg) => CoordinationError::EmailFetchFailed(msg),
        OAuth2Error::NoVerifiedPrimaryEmail => CoordinationError::NoVerifiedPrimaryEmail,
        OAuth2Error::AuthUrl(msg) | OAuth2Error::Client(msg) => {
            CoordinationError::StateIssueFailed(msg)
        }
        OAuth2Error::Utils(e) => CoordinationError::StateIssueFailed(e.to_string()),
    }
}
