use std::time::Duration;

use reqwest::header::ACCEPT;
use url::Url;

use crate::oauth2::config::GithubConfig;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{AccessToken, GithubEmail, GithubTokenResponse, GithubUser};

const GITHUB_API_ACCEPT: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Talks to GitHub's OAuth and REST endpoints. None of the calls are retried: an authorization
/// code is single-use, so a failed exchange ends the login attempt.
#[derive(Clone, Debug)]
pub struct GithubClient {
    config: GithubConfig,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig, timeout: Duration) -> Result<Self, OAuth2Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .map_err(|e| OAuth2Error::Client(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// The URL the browser is sent to for consent.
    pub fn authorization_url(&self, state: &str) -> Result<String, OAuth2Error> {
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("scope", self.config.scope.as_str()),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| OAuth2Error::AuthUrl(e.to_string()))?;
        Ok(url.into())
    }

    #[tracing::instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, OAuth2Error> {
        let response = self
            .http
            .post(&self.config.token_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Token endpoint returned {}: {}", status, body);
            return Err(OAuth2Error::TokenExchange(status.to_string()));
        }

        let token_response: GithubTokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(format!("Unreadable token response: {e}")))?;

        if let Some(error) = token_response.error {
            let description = token_response.error_description.unwrap_or_default();
            return Err(OAuth2Error::TokenExchange(format!("{error}: {description}")));
        }

        match token_response.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken(token)),
            _ => Err(OAuth2Error::TokenExchange(
                "Token response carried no access_token".to_string(),
            )),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<GithubUser, OAuth2Error> {
        let url = format!("{}/user", self.config.api_base_url);
        let response = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_API_ACCEPT)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| OAuth2Error::FetchUserInfo(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuth2Error::FetchUserInfo(status.to_string()));
        }

        let user: GithubUser = response
            .json()
            .await
            .map_err(|e| OAuth2Error::FetchUserInfo(format!("Unreadable profile: {e}")))?;

        tracing::debug!(github_id = user.id, login = %user.login, "Fetched GitHub profile");
        Ok(user)
    }

    #[tracing::instrument(skip_all)]
    pub async fn fetch_verified_emails(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<GithubEmail>, OAuth2Error> {
        let url = format!("{}/user/emails", self.config.api_base_url);
        let response = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_API_ACCEPT)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| OAuth2Error::FetchEmails(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuth2Error::FetchEmails(status.to_string()));
        }

        let emails: Vec<GithubEmail> = response
            .json()
            .await
            .map_err(|e| OAuth2Error::FetchEmails(format!("Unreadable email list: {e}")))?;

        tracing::debug!(count = emails.len(), "Fetched GitHub emails");
        Ok(emails)
    }
}

/// The first address GitHub marks both primary and verified. Never falls back to anything else.
pub fn select_primary_verified_email(emails: &[GithubEmail]) -> Result<&GithubEmail, OAuth2Error> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .ok_or(OAuth2Error::NoVerifiedPrimaryEmail)
}
