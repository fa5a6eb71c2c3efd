use std::fmt;
use std::sync::LazyLock;

use crate::utils::clamp_max_age;

pub(super) const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
pub(super) const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub(super) const GITHUB_API_URL: &str = "https://api.github.com";
pub(super) const GITHUB_SCOPE: &str = "user:email";

pub static OAUTH2_STATE_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("OAUTH2_STATE_COOKIE_NAME")
        .ok()
        .unwrap_or("oauthstate".to_string())
});

pub static OAUTH2_STATE_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("OAUTH2_STATE_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(clamp_max_age)
        .unwrap_or(3600)
});

/// OAuth application registration and endpoints for GitHub.
#[derive(Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub scope: String,
}

impl GithubConfig {
    /// Registration values with the public GitHub endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            auth_url: GITHUB_AUTH_URL.to_string(),
            token_url: GITHUB_TOKEN_URL.to_string(),
            api_base_url: GITHUB_API_URL.to_string(),
            scope: GITHUB_SCOPE.to_string(),
        }
    }

    /// Point every endpoint at `base`, e.g. a local stand-in for GitHub.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{base}/login/oauth/authorize");
        self.token_url = format!("{base}/login/oauth/access_token");
        self.api_base_url = base.to_string();
        self
    }
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("scope", &self.scope)
            .finish()
    }
}
