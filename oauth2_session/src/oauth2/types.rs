use std::fmt;

use serde::{Deserialize, Serialize};

/// Query parameters GitHub appends to the callback URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GitHub answers token requests with 200 even on failure, so every field is optional.
#[derive(Debug, Deserialize)]
pub(super) struct GithubTokenResponse {
    pub(super) access_token: Option<String>,
    #[allow(dead_code)]
    pub(super) token_type: Option<String>,
    #[allow(dead_code)]
    pub(super) scope: Option<String>,
    pub(super) error: Option<String>,
    pub(super) error_description: Option<String>,
}

/// Bearer token for the GitHub API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// `GET /user`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubUser {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One entry of `GET /user/emails`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
    pub visibility: Option<String>,
}

/// Everything fetched from GitHub about the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedProfile {
    pub provider_user_id: i64,
    pub login: String,
    pub name: Option<String>,
    pub public_email: Option<String>,
    pub emails: Vec<GithubEmail>,
}

impl FederatedProfile {
    pub fn new(user: GithubUser, emails: Vec<GithubEmail>) -> Self {
        Self {
            provider_user_id: user.id,
            login: user.login,
            name: user.name,
            public_email: user.email,
            emails,
        }
    }
}

/// The part of a federated profile trusted for account matching.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub login: String,
    pub name: Option<String>,
}
