use std::time::Duration;

use http::header::{COOKIE, HeaderMap, HeaderValue};
use oauth2_session::{
    AuthConfig, AuthContext, AuthResponse, AuthorizedOutcome, CoordinationError, GithubConfig,
    StoreConfig, init_with_config, prepare_login_core,
};

use super::MockGithub;

pub const FRONTEND_URL: &str = "http://localhost:5173";

/// A mock GitHub plus an auth context wired to it with in-memory stores.
pub struct TestHarness {
    pub github: MockGithub,
    pub ctx: AuthContext,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_http_timeout(Duration::from_secs(5)).await
    }

    pub async fn with_http_timeout(http_timeout: Duration) -> Self {
        let github = MockGithub::start().await;
        let config = AuthConfig {
            github: GithubConfig::new(
                "test-client-id",
                "test-client-secret",
                "http://localhost:8080/auth/oauth/callback",
            )
            .with_base_url(&github.base_url),
            port: 8080,
            frontend_url: FRONTEND_URL.to_string(),
            http_timeout,
            storage_timeout: Duration::from_secs(5),
            default_avatar: "uploads/avatars/default.png".to_string(),
            stores: StoreConfig::in_memory(),
        };
        let ctx = init_with_config(config).await.unwrap();
        Self { github, ctx }
    }

    /// Start a login and return the issued state.
    pub fn start_login(&self) -> String {
        let redirect = prepare_login_core(&self.ctx).unwrap();
        assert!(redirect.auth_url.starts_with(&self.github.base_url));
        redirect.state_cookie.value
    }

    /// Deliver a callback as the browser would: state cookie plus `code`/`state` query.
    pub async fn callback(
        &self,
        code: &str,
        cookie_state: Option<&str>,
        query_state: Option<&str>,
    ) -> Result<AuthorizedOutcome, CoordinationError> {
        let headers = match cookie_state {
            Some(state) => cookie_header("oauthstate", state),
            None => HeaderMap::new(),
        };
        let response = AuthResponse {
            code: Some(code.to_string()),
            state: query_state.map(str::to_string),
            ..Default::default()
        };
        oauth2_session::get_authorized_core(&self.ctx, &response, &headers).await
    }

    /// A full, honest round trip for `code`.
    pub async fn login(&self, code: &str) -> Result<AuthorizedOutcome, CoordinationError> {
        let state = self.start_login();
        self.callback(code, Some(&state), Some(&state)).await
    }
}

pub fn cookie_header(name: &str, value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("{name}={value}")).unwrap(),
    );
    headers
}
