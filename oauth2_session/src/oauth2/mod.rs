mod config;
mod errors;
mod main;
mod types;

pub use config::{GithubConfig, OAUTH2_STATE_COOKIE_MAX_AGE, OAUTH2_STATE_COOKIE_NAME};
pub use errors::OAuth2Error;
pub use main::{GithubClient, select_primary_verified_email};
pub(crate) use main::{clear_state_cookie, issue_state, state_cookie_from, verify_state};
pub use types::{AccessToken, AuthResponse, FederatedProfile, GithubEmail, GithubUser, VerifiedIdentity};
