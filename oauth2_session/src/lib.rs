//! oauth2_session - GitHub sign-in and cookie sessions for a social-network backend
//!
//! The crate drives the OAuth2 authorization-code flow against GitHub with a cookie-bound
//! anti-forgery state, maps the signed-in GitHub user onto exactly one local account (keyed by
//! primary verified email) and issues the opaque session token every protected endpoint checks.

mod config;
mod coordination;
mod oauth2;
mod session;
mod storage;
mod userdb;
mod utils;

pub use config::{AUTH_ROUTE_PREFIX, AuthConfig, ConfigError};

pub use coordination::{
    AuthContext, AuthorizedOutcome, CoordinationError, IdentityResolver, InitError, LoginRedirect,
    get_account_core, get_authorized_core, logout_core, prepare_login_core, validate_session_core,
};

pub use oauth2::{
    AccessToken, AuthResponse, FederatedProfile, GithubClient, GithubConfig, GithubEmail,
    GithubUser, OAUTH2_STATE_COOKIE_MAX_AGE, OAUTH2_STATE_COOKIE_NAME, OAuth2Error,
    VerifiedIdentity, select_primary_verified_email,
};

pub use session::{
    SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME, SessionError, SessionManager, spawn_session_sweeper,
};

pub use storage::{CacheStoreKind, DataStoreKind, StoreConfig};

pub use userdb::{Account, AccountStore, NewAccount, UserError};

pub use utils::{CookieDescriptor, UtilError};

/// Read configuration from the environment and build the auth context.
pub async fn init() -> Result<AuthContext, InitError> {
    let config = AuthConfig::from_env()?;
    init_with_config(config).await
}

pub async fn init_with_config(config: AuthConfig) -> Result<AuthContext, InitError> {
    AuthContext::new(config).await
}
