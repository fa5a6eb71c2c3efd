use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use http::header::HeaderMap;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::session::config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME, SESSION_STORE_PREFIX};
use crate::session::errors::SessionError;
use crate::session::types::StoredSession;
use crate::storage::{CacheData, CacheStore, StorageError};
use crate::utils::{CookieDescriptor, clamp_max_age, gen_random_string, get_cookie};

const SESSION_TOKEN_BYTES: usize = 32;
const MAX_TOKEN_LEN: usize = 128;
const ISSUE_ATTEMPTS: usize = 3;

/// Issues, validates and revokes first-party session tokens.
///
/// Cloning is cheap; every clone talks to the same store. Lookups share the store lock; writes
/// take it exclusively, and only for the duration of a single store call.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<RwLock<Box<dyn CacheStore>>>,
    cookie_name: String,
    ttl: u64,
    op_timeout: Duration,
}

impl SessionManager {
    pub(crate) fn new(store: Box<dyn CacheStore>, op_timeout: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            ttl: *SESSION_COOKIE_MAX_AGE,
            op_timeout,
        }
    }

    /// Override the session lifetime in seconds, capped at the longest cookie `Max-Age`.
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = clamp_max_age(ttl);
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    async fn timed<T>(
        &self,
        op: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, SessionError> {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result.map_err(|e| SessionError::Storage(e.to_string())),
            Err(_) => Err(SessionError::Timeout),
        }
    }

    /// Store a fresh token for `account_id` and return it with its cookie.
    #[tracing::instrument(skip(self))]
    pub async fn issue(&self, account_id: i64) -> Result<(String, CookieDescriptor), SessionError> {
        let now = Utc::now();
        let stored = StoredSession {
            account_id,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(self.ttl as i64),
            ttl: self.ttl,
        };
        let data = CacheData::try_from(&stored)?;

        for _ in 0..ISSUE_ATTEMPTS {
            let token = gen_random_string(SESSION_TOKEN_BYTES)?;
            let inserted = self
                .timed(async {
                    self.store
                        .write()
                        .await
                        .put_if_not_exists(
                            SESSION_STORE_PREFIX,
                            &token,
                            data.clone(),
                            self.ttl as usize,
                        )
                        .await
                })
                .await?;

            if inserted {
                tracing::debug!("Session issued");
                let cookie = CookieDescriptor::new(&self.cookie_name, token.clone(), self.ttl as i64);
                return Ok((token, cookie));
            }
            tracing::warn!("Session token collision, drawing a new one");
        }

        Err(SessionError::Crypto(
            "Could not draw an unused session token".to_string(),
        ))
    }

    /// Resolve the session cookie on a request to the owning account id.
    pub async fn validate(&self, headers: &HeaderMap) -> Result<i64, SessionError> {
        let token = get_cookie(headers, &self.cookie_name).ok_or(SessionError::Unauthenticated)?;
        self.validate_token(&token).await
    }

    /// Resolve a raw token to the owning account id. Expiry is never extended here.
    pub async fn validate_token(&self, token: &str) -> Result<i64, SessionError> {
        if !is_well_formed(token) {
            return Err(SessionError::Unauthenticated);
        }

        let data = self
            .timed(async {
                self.store
                    .read()
                    .await
                    .get(SESSION_STORE_PREFIX, token)
                    .await
            })
            .await?
            .ok_or(SessionError::Unauthenticated)?;

        let stored = match StoredSession::try_from(data) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Discarding unreadable session record: {}", e);
                return Err(SessionError::Unauthenticated);
            }
        };

        if stored.expires_at <= Utc::now() {
            tracing::debug!("Session expired");
            self.invalidate_token(token).await?;
            return Err(SessionError::Unauthenticated);
        }

        Ok(stored.account_id)
    }

    /// Revoke the session named by the request cookie, if any, and return a clearing cookie.
    pub async fn invalidate(&self, headers: &HeaderMap) -> Result<CookieDescriptor, SessionError> {
        if let Some(token) = get_cookie(headers, &self.cookie_name) {
            if is_well_formed(&token) {
                self.invalidate_token(&token).await?;
            }
        }
        Ok(CookieDescriptor::expired(&self.cookie_name))
    }

    /// Revoke one token. Revoking an unknown token is not an error.
    pub async fn invalidate_token(&self, token: &str) -> Result<(), SessionError> {
        self.timed(async {
            self.store
                .write()
                .await
                .remove(SESSION_STORE_PREFIX, token)
                .await
        })
        .await
    }

    /// Drop expired session records from stores that do not expire keys on their own.
    pub async fn sweep_expired(&self) -> Result<usize, SessionError> {
        self.timed(async { self.store.write().await.purge_expired().await })
            .await
    }
}

fn is_well_formed(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Run [`SessionManager::sweep_expired`] every `period` until the runtime shuts down.
pub fn spawn_session_sweeper(manager: SessionManager, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            match manager.sweep_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Swept {} expired sessions", n),
                Err(e) => tracing::error!("Session sweep failed: {}", e),
            }
        }
    })
}
