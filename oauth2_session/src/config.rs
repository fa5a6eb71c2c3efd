use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::oauth2::GithubConfig;
use crate::storage::{CacheStoreKind, DataStoreKind, StoreConfig};

/// Path prefix the auth routes are mounted under.
pub static AUTH_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_ROUTE_PREFIX")
        .ok()
        .unwrap_or("/auth".to_string())
});

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_AVATAR_PATH: &str = "uploads/avatars/default.png";
const DEFAULT_DATA_STORE_URL: &str = "sqlite:data/db/app.db";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub github: GithubConfig,
    pub port: u16,
    /// Origin the browser lands on after login, without a trailing slash.
    pub frontend_url: String,
    pub http_timeout: Duration,
    pub storage_timeout: Duration,
    pub default_avatar: String,
    pub stores: StoreConfig,
}

impl AuthConfig {
    /// Read the process environment. Call after `.env` has been loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let client_id = required("GITHUB_CLIENT_ID")?;
        let client_secret = required("GITHUB_CLIENT_SECRET")?;
        let redirect_url = required("GITHUB_REDIRECT_URL")?;

        let mut github = GithubConfig::new(client_id, client_secret, redirect_url);
        if let Some(url) = get("GITHUB_AUTH_URL") {
            github.auth_url = url;
        }
        if let Some(url) = get("GITHUB_TOKEN_URL") {
            github.token_url = url;
        }
        if let Some(url) = get("GITHUB_API_URL") {
            github.api_base_url = url.trim_end_matches('/').to_string();
        }

        let port = parse_or_default(get("PORT"), "PORT", DEFAULT_PORT)?;
        let frontend_url = parse_frontend_url(&get("FRONTEND_URL").unwrap_or_else(|| {
            tracing::info!("FRONTEND_URL not set, defaulting to {}", DEFAULT_FRONTEND_URL);
            DEFAULT_FRONTEND_URL.to_string()
        }))?;
        let http_timeout = Duration::from_secs(parse_or_default(
            get("OAUTH2_HTTP_TIMEOUT_SECS"),
            "OAUTH2_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let storage_timeout = Duration::from_secs(parse_or_default(
            get("STORAGE_TIMEOUT_SECS"),
            "STORAGE_TIMEOUT_SECS",
            DEFAULT_STORAGE_TIMEOUT_SECS,
        )?);
        let default_avatar =
            get("DEFAULT_AVATAR_PATH").unwrap_or_else(|| DEFAULT_AVATAR_PATH.to_string());

        let stores = StoreConfig {
            cache_kind: parse_kind::<CacheStoreKind>(get("GENERIC_CACHE_STORE_TYPE"), "GENERIC_CACHE_STORE_TYPE", "memory")?,
            cache_url: get("GENERIC_CACHE_STORE_URL").unwrap_or_default(),
            data_kind: parse_kind::<DataStoreKind>(get("GENERIC_DATA_STORE_TYPE"), "GENERIC_DATA_STORE_TYPE", "sqlite")?,
            data_url: get("GENERIC_DATA_STORE_URL")
                .unwrap_or_else(|| DEFAULT_DATA_STORE_URL.to_string()),
        };

        Ok(Self {
            github,
            port,
            frontend_url,
            http_timeout,
            storage_timeout,
            default_avatar,
            stores,
        })
    }
}

/// An absolute http(s) URL, serialized in its ASCII form without a trailing slash.
fn parse_frontend_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "FRONTEND_URL",
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid(format!("{raw} is not an http(s) origin")));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn parse_or_default<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => {
            tracing::info!("{} not set, defaulting to {}", name, default);
            Ok(default)
        }
    }
}

fn parse_kind<T>(raw: Option<String>, name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
{
    raw.as_deref()
        .unwrap_or(default)
        .parse()
        .map_err(|reason| ConfigError::Invalid { name, reason })
}
