use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use crate::oauth2::VerifiedIdentity;
use crate::userdb::{Account, AccountStore, NewAccount, UserError};
use crate::utils::{gen_random_string, random_date_of_birth};

use super::errors::CoordinationError;

/// Marks credentials that no password hash can produce.
const FEDERATED_CREDENTIAL_PREFIX: &str = "!oauth2$";

pub(super) async fn with_timeout<T>(
    timeout: Duration,
    op: impl Future<Output = Result<T, UserError>>,
) -> Result<T, UserError> {
    tokio::time::timeout(timeout, op)
        .await
        .unwrap_or_else(|_| Err(UserError::Storage("Account store timed out".to_string())))
}

/// Maps a verified federated email to exactly one local account.
///
/// The UNIQUE constraint on `email` is what makes concurrent first logins safe: a losing insert
/// is treated as "already exists" and resolved by reading the winner's row.
#[derive(Clone)]
pub struct IdentityResolver {
    accounts: AccountStore,
    default_avatar: String,
    timeout: Duration,
}

impl IdentityResolver {
    pub(crate) fn new(accounts: AccountStore, default_avatar: String, timeout: Duration) -> Self {
        Self {
            accounts,
            default_avatar,
            timeout,
        }
    }

    /// Returns the account and whether this call created it. Existing rows are never updated.
    #[tracing::instrument(skip(self, identity), fields(login = %identity.login))]
    pub async fn find_or_create(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<(Account, bool), CoordinationError> {
        if let Some(account) = self.lookup(&identity.email).await? {
            tracing::debug!(account_id = account.id, "Existing account");
            return Ok((account, false));
        }

        let new_account = self.new_account(identity)?;

        let created = match with_timeout(self.timeout, self.accounts.insert(&new_account)).await {
            Ok(()) => true,
            Err(UserError::DuplicateEmail) => {
                tracing::debug!("Account was created concurrently, reading it back");
                false
            }
            Err(e) => return Err(CoordinationError::AccountCreateFailed(e.to_string())),
        };

        let account = self.lookup(&identity.email).await?.ok_or_else(|| {
            CoordinationError::AccountCreateFailed("Account missing after insert".to_string())
        })?;

        if created {
            tracing::info!(account_id = account.id, "Created account from GitHub login");
        }
        Ok((account, created))
    }

    async fn lookup(&self, email: &str) -> Result<Option<Account>, CoordinationError> {
        with_timeout(self.timeout, self.accounts.find_by_email(email))
            .await
            .map_err(|e| CoordinationError::AccountLookupFailed(e.to_string()))
    }

    fn new_account(&self, identity: &VerifiedIdentity) -> Result<NewAccount, CoordinationError> {
        let secret = gen_random_string(32)
            .map_err(|e| CoordinationError::AccountCreateFailed(e.to_string()))?;
        let date_of_birth = random_date_of_birth(Utc::now().date_naive())
            .map_err(|e| CoordinationError::AccountCreateFailed(e.to_string()))?;

        Ok(NewAccount {
            email: identity.email.clone(),
            credential: format!("{FEDERATED_CREDENTIAL_PREFIX}{secret}"),
            first_name: identity.login.clone(),
            last_name: String::new(),
            date_of_birth,
            nickname: Some(identity.login.clone()),
            about: Some(String::new()),
            avatar_path: Some(self.default_avatar.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoreConfig, connect_data_store};
    use chrono::{Datelike, NaiveDate};
    use std::sync::Arc;

    async fn resolver() -> (IdentityResolver, AccountStore) {
        let data_store = connect_data_store(&StoreConfig::in_memory()).unwrap();
        let accounts = AccountStore::new(data_store);
        accounts.init().await.unwrap();
        let resolver = IdentityResolver::new(
            accounts.clone(),
            "uploads/avatars/default.png".to_string(),
            Duration::from_secs(5),
        );
        (resolver, accounts)
    }

    fn identity(email: &str, login: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            email: email.to_string(),
            login: login.to_string(),
            name: Some("Mona Lisa".to_string()),
        }
    }

    #[tokio::test]
    async fn test_creates_account_from_identity() {
        // Given no account for the email
        let (resolver, _) = resolver().await;

        // When resolving a GitHub identity
        let (account, created) = resolver
            .find_or_create(&identity("b@x.com", "octocat"))
            .await
            .unwrap();

        // Then a new account is built from the login
        assert!(created);
        assert_eq!(account.email, "b@x.com");
        assert_eq!(account.first_name, "octocat");
        assert_eq!(account.nickname.as_deref(), Some("octocat"));
        assert_eq!(account.last_name, "");
        assert_eq!(account.avatar_path.as_deref(), Some("uploads/avatars/default.png"));

        // And the credential is a random placeholder unusable as a password hash
        assert!(account.credential.starts_with(FEDERATED_CREDENTIAL_PREFIX));
        assert!(account.credential.len() > FEDERATED_CREDENTIAL_PREFIX.len() + 40);

        // And the generated birth date is between 18 and 80 years ago
        let age = Utc::now().date_naive().year() - account.date_of_birth.year();
        assert!((17..=81).contains(&age));
    }

    #[tokio::test]
    async fn test_placeholder_credentials_differ() {
        let (resolver, _) = resolver().await;
        let (a, _) = resolver.find_or_create(&identity("a@x.com", "a")).await.unwrap();
        let (b, _) = resolver.find_or_create(&identity("b@x.com", "b")).await.unwrap();
        assert_ne!(a.credential, b.credential);
    }

    #[tokio::test]
    async fn test_existing_account_is_returned_unchanged() {
        // Given an account created through native signup with user-edited fields
        let (resolver, accounts) = resolver().await;
        accounts
            .insert(&NewAccount {
                email: "b@x.com".to_string(),
                credential: "$argon2id$native".to_string(),
                first_name: "Barbara".to_string(),
                last_name: "Liskov".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1939, 11, 7).unwrap(),
                nickname: Some("barb".to_string()),
                about: Some("hello".to_string()),
                avatar_path: Some("uploads/avatars/me.png".to_string()),
            })
            .await
            .unwrap();

        // When the same email signs in through GitHub
        let (account, created) = resolver
            .find_or_create(&identity("b@x.com", "octocat"))
            .await
            .unwrap();

        // Then the native account is reused and nothing is overwritten
        assert!(!created);
        assert_eq!(account.first_name, "Barbara");
        assert_eq!(account.nickname.as_deref(), Some("barb"));
        assert_eq!(account.credential, "$argon2id$native");
    }

    #[tokio::test]
    async fn test_repeat_login_is_idempotent() {
        let (resolver, _) = resolver().await;
        let (first, created_first) = resolver
            .find_or_create(&identity("c@x.com", "c"))
            .await
            .unwrap();
        let (second, created_second) = resolver
            .find_or_create(&identity("c@x.com", "c"))
            .await
            .unwrap();

        assert!(created_first);
        assert!(!created_second);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_concurrent_first_logins_create_one_account() {
        // Given many callbacks racing for the same new email
        let (resolver, _) = resolver().await;
        let resolver = Arc::new(resolver);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                resolver.find_or_create(&identity("race@x.com", "racer")).await
            }));
        }

        // When they all finish
        let mut ids = Vec::new();
        let mut created = 0;
        for handle in handles {
            let (account, was_created) = handle.await.unwrap().unwrap();
            ids.push(account.id);
            created += usize::from(was_created);
        }

        // Then they all resolve to one row and only one of them created it
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_slow_account_store_times_out() {
        // Given an account call slower than the storage timeout
        let slow = async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok::<_, UserError>(None::<Account>)
        };

        // When it runs under the timeout
        let result = with_timeout(Duration::from_millis(50), slow).await;

        // Then it fails as a storage error rather than hanging
        assert!(matches!(result, Err(UserError::Storage(_))));
    }
}
