use thiserror::Error;

use crate::config::{AuthConfig, ConfigError};
use crate::oauth2::{GithubClient, OAuth2Error};
use crate::session::SessionManager;
use crate::storage::{connect_cache_store, connect_data_store};
use crate::userdb::{AccountStore, UserError};

use super::identity::IdentityResolver;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Account table error: {0}")]
    Account(#[from] UserError),

    #[error("OAuth2 client error: {0}")]
    OAuth2(#[from] OAuth2Error),
}

/// Everything the auth flows need, built once at startup and shared by all requests.
pub struct AuthContext {
    pub(crate) config: AuthConfig,
    pub(crate) github: GithubClient,
    pub(crate) accounts: AccountStore,
    pub(crate) sessions: SessionManager,
    pub(crate) identities: IdentityResolver,
}

impl AuthContext {
    /// Connect the stores, prepare the account table and build the GitHub client.
    pub async fn new(config: AuthConfig) -> Result<Self, InitError> {
        let github = GithubClient::new(config.github.clone(), config.http_timeout)?;

        let cache_store = connect_cache_store(&config.stores)
            .await
            .map_err(|e| InitError::Storage(e.to_string()))?;
        let data_store =
            connect_data_store(&config.stores).map_err(|e| InitError::Storage(e.to_string()))?;

        let accounts = AccountStore::new(data_store);
        accounts.init().await?;

        let sessions = SessionManager::new(cache_store, config.storage_timeout);
        let identities = IdentityResolver::new(
            accounts.clone(),
            config.default_avatar.clone(),
            config.storage_timeout,
        );

        tracing::info!(
            cache = ?config.stores.cache_kind,
            data = ?config.stores.data_kind,
            "Auth context ready"
        );

        Ok(Self {
            config,
            github,
            accounts,
            sessions,
            identities,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn identities(&self) -> &IdentityResolver {
        &self.identities
    }
}
