use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::errors::SessionError;
use crate::storage::CacheData;

/// The server-side half of a session: what a token maps to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(super) struct StoredSession {
    pub(super) account_id: i64,
    pub(super) created_at: DateTime<Utc>,
    pub(super) expires_at: DateTime<Utc>,
    pub(super) ttl: u64,
}

impl TryFrom<&StoredSession> for CacheData {
    type Error = SessionError;

    fn try_from(session: &StoredSession) -> Result<Self, Self::Error> {
        let value = serde_json::to_string(session)
            .map_err(|e| SessionError::Storage(format!("Failed to serialize session: {e}")))?;
        Ok(CacheData { value })
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value)
            .map_err(|e| SessionError::Storage(format!("Failed to deserialize session: {e}")))
    }
}
