use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{Account, NewAccount},
};

use super::config::DB_TABLE_USERS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            credential TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            date_of_birth DATE NOT NULL,
            nickname TEXT,
            about TEXT,
            avatar_path TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_user_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let users_table = DB_TABLE_USERS.as_str();

    let expected_columns = [
        ("id", "bigint"),
        ("email", "text"),
        ("credential", "text"),
        ("first_name", "text"),
        ("last_name", "text"),
        ("date_of_birth", "date"),
        ("nickname", "text"),
        ("about", "text"),
        ("avatar_path", "text"),
        ("created_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(pool, users_table, &expected_columns, UserError::Storage).await
}

pub(super) async fn find_by_email_postgres(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<Account>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let account = sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE email = $1
        "#
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub(super) async fn get_account_postgres(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<Option<Account>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let account = sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub(super) async fn insert_account_postgres(
    pool: &Pool<Postgres>,
    account: &NewAccount,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name}
            (email, credential, first_name, last_name, date_of_birth, nickname, about, avatar_path, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#
    ))
    .bind(&account.email)
    .bind(&account.credential)
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(account.date_of_birth)
    .bind(&account.nickname)
    .bind(&account.about)
    .bind(&account.avatar_path)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}
