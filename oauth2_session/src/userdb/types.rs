use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A local account row.
///
/// `email` is the identity key shared by native and federated signup.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Account {
    pub id: i64,
    pub email: String,
    /// Opaque credential material; never sent to clients.
    #[serde(skip_serializing, default)]
    pub credential: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub nickname: Option<String>,
    pub about: Option<String>,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for an account that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub credential: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub nickname: Option<String>,
    pub about: Option<String>,
    pub avatar_path: Option<String>,
}
