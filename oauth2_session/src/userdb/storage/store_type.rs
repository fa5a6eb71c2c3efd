use std::sync::Arc;

use crate::storage::DataStore;
use crate::userdb::{
    errors::UserError,
    types::{Account, NewAccount},
};

use super::postgres::*;
use super::sqlite::*;

/// Account table access over whichever relational backend is configured.
#[derive(Clone)]
pub struct AccountStore {
    data_store: Arc<dyn DataStore>,
}

impl AccountStore {
    pub(crate) fn new(data_store: Arc<dyn DataStore>) -> Self {
        Self { data_store }
    }

    /// Create the account table if needed and check its columns.
    pub(crate) async fn init(&self) -> Result<(), UserError> {
        let store = &self.data_store;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_user_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_user_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, UserError> {
        let store = &self.data_store;

        let result = if let Some(pool) = store.as_sqlite() {
            find_by_email_sqlite(pool, email).await
        } else if let Some(pool) = store.as_postgres() {
            find_by_email_postgres(pool, email).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(found) => tracing::debug!(found = found.is_some(), "Account lookup completed"),
            Err(e) => tracing::error!(error = %e, "Account lookup failed"),
        }

        result
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_account(&self, id: i64) -> Result<Option<Account>, UserError> {
        let store = &self.data_store;

        if let Some(pool) = store.as_sqlite() {
            get_account_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            get_account_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Insert a new account. A taken email fails with [`UserError::DuplicateEmail`].
    #[tracing::instrument(skip(self, account), fields(email = %account.email))]
    pub async fn insert(&self, account: &NewAccount) -> Result<(), UserError> {
        let store = &self.data_store;

        if let Some(pool) = store.as_sqlite() {
            insert_account_sqlite(pool, account).await
        } else if let Some(pool) = store.as_postgres() {
            insert_account_postgres(pool, account).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}
