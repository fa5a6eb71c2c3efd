use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{Account, NewAccount},
};

use super::config::DB_TABLE_USERS;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            credential TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            date_of_birth DATE NOT NULL,
            nickname TEXT,
            about TEXT,
            avatar_path TEXT,
            created_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_user_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let users_table = DB_TABLE_USERS.as_str();

    let expected_columns = [
        ("id", "INTEGER"),
        ("email", "TEXT"),
        ("credential", "TEXT"),
        ("first_name", "TEXT"),
        ("last_name", "TEXT"),
        ("date_of_birth", "DATE"),
        ("nickname", "TEXT"),
        ("about", "TEXT"),
        ("avatar_path", "TEXT"),
        ("created_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(pool, users_table, &expected_columns, UserError::Storage).await
}

pub(super) async fn find_by_email_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<Account>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let account = sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE email = ?
        "#
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub(super) async fn get_account_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<Option<Account>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let account = sqlx::query_as::<_, Account>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub(super) async fn insert_account_sqlite(
    pool: &Pool<Sqlite>,
    account: &NewAccount,
) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name}
            (email, credential, first_name, last_name, date_of_birth, nickname, about, avatar_path, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
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
