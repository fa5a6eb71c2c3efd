use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => UserError::DuplicateEmail,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                UserError::InvalidData(err.to_string())
            }
            other => UserError::Storage(other.to_string()),
        }
    }
}
